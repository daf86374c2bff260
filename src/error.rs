//! Error types for the chaingen library.
//!
//! Every fallible operation in the library returns [`Result`]. Deciding whether
//! an error aborts the process is left to the caller; the `chaingen` binary
//! treats all of them as fatal.

use thiserror::Error;

/// The main error type for chaingen operations.
///
/// Variants fall into two groups: environment failures (randomness, encoding,
/// filesystem) and programming errors in the calling fixture script, such as
/// signing with an entity that was never promoted to a CA.
#[derive(Error, Debug)]
pub enum ChainGenError {
    /// Key generation, randomness or signature operation failed
    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    /// Invalid key format or content
    #[error("Invalid key: {0}")]
    InvalidKeyError(String),

    /// Certificate encoding or decoding error
    #[error("Certificate error: {0}")]
    CertificateError(String),

    /// An entity without a serial counter was used as an issuer
    #[error("Not a CA: {0}")]
    NotCaError(String),

    /// The requested signature algorithm cannot be produced with the issuer's key
    #[error("Unsupported signature algorithm {algorithm} for {key} issuer key")]
    UnsupportedAlgorithm { algorithm: String, key: String },

    /// The CA serial counter cannot be advanced any further
    #[error("Serial numbers exhausted for CA: {0}")]
    SerialExhausted(String),

    /// Storage I/O error
    #[error("Storage I/O error: {0}")]
    StorageError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid input data
    #[error("Parse error: {0}")]
    ParseError(String),

    /// PEM encoding/decoding error
    #[error("PEM error: {0}")]
    PemError(String),

    /// Chain plan is inconsistent
    #[error("Plan error: {0}")]
    PlanError(String),
}

/// A specialized Result type for chaingen operations.
pub type Result<T> = std::result::Result<T, ChainGenError>;
