//! Certificate generation module.
//!
//! This module provides the fixture entity model and the signing engine:
//! entities own a key and a template, CAs additionally own a serial counter,
//! and signing turns a child template into a DER certificate.

pub mod algorithm;
pub mod ca;
pub mod entity;
pub mod loader;
pub mod signer;
pub mod template;
pub mod x509_signing;
