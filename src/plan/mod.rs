//! Chain plans.
//!
//! A chain plan is a JSON description of the entities in a fixture set and
//! the certificates to issue between them. The `chaingen` binary reads plans
//! from disk; tests can build them in code.

pub mod manifest;
pub mod runner;

pub use manifest::{CertificateSpec, ChainPlan, EntitySpec};
