//! Cryptographic operations module.
//!
//! This module provides the key material behind every fixture entity:
//!
//! - ECDSA P-256 key generation and prehash signing
//! - OS randomness for CA serial seeds
//!
//! # Example
//!
//! ```rust
//! use chaingen::crypto::p256::generate_p256_keypair;
//! use sha2::{Digest, Sha256};
//!
//! # fn example() -> chaingen::error::Result<()> {
//! let keypair = generate_p256_keypair()?;
//! let digest = Sha256::digest(b"to be signed");
//! let signature = keypair.sign_prehash(&digest)?;
//! keypair.verify_prehash(&digest, &signature)?;
//! # Ok(())
//! # }
//! ```

pub mod p256;
pub mod rng;
