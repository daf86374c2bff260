//! chaingen: synthetic X.509 certificate chains for test fixtures
//!
//! This library builds throwaway certificate chains with predictable shape.
//! It enables test authors to:
//!
//! - Create P-256 keyed entities and promote some of them to CAs
//! - Issue certificates with strictly increasing per-CA serial numbers
//! - Override the signature algorithm of individual certificates
//! - Write the results as PEM fixture files, directly or from a JSON plan
//!
//! # Architecture
//!
//! Every operation returns a [`Result`]; nothing in the library exits the
//! process. The `chaingen` binary is the place where errors become fatal.
//!
//! # Example
//!
//! ```rust,no_run
//! use chaingen::cert::entity::Entity;
//! use chaingen::output::pem::{sign_to_file, write_pem_file};
//! use chaingen::error::Result;
//!
//! fn example() -> Result<()> {
//!     let mut root = Entity::new_ca("root")?;
//!     let leaf = Entity::new("leaf")?;
//!
//!     write_pem_file("root", &root.sign_self()?)?;
//!     sign_to_file(&mut root, &leaf, "leaf", None)?;
//!     Ok(())
//! }
//! ```

pub mod cert;
pub mod crypto;
pub mod error;
pub mod output;
pub mod plan;

// Re-export commonly used types
pub use cert::algorithm::SignatureAlgorithm;
pub use cert::entity::Entity;
pub use error::{ChainGenError, Result};
