//! ECDSA P-256 key operations.
//!
//! This module provides functions for generating P-256 keypairs and for
//! signing and verifying precomputed digests with them.

use crate::error::{ChainGenError, Result};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::EncodePublicKey;
use rand::rngs::OsRng;

/// Name of the curve used for every generated key.
pub const CURVE_NAME: &str = "P-256";

/// A P-256 keypair consisting of a secret key and public key.
#[derive(Debug, Clone)]
pub struct Keypair {
    pub secret: SigningKey,
    pub public: VerifyingKey,
}

impl Keypair {
    /// Create a new keypair from a signing key.
    pub fn from_secret(secret: SigningKey) -> Self {
        let public = *secret.verifying_key();
        Self { secret, public }
    }

    /// Get the public key as an uncompressed SEC1 point (`0x04 || x || y`).
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public.to_encoded_point(false).as_bytes().to_vec()
    }

    /// Get the secret scalar as bytes.
    pub fn secret_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.secret.to_bytes());
        out
    }

    /// DER-encoded SubjectPublicKeyInfo for the public key.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        public_key_der(&self.public)
    }

    /// Sign a digest that was computed by the caller.
    ///
    /// Digests longer than the curve order are truncated as ECDSA requires,
    /// which is what allows SHA-384 and SHA-512 signatures from a P-256 key.
    pub fn sign_prehash(&self, prehash: &[u8]) -> Result<Signature> {
        self.secret
            .sign_prehash(prehash)
            .map_err(|e| ChainGenError::CryptoError(format!("Failed to sign digest: {}", e)))
    }

    /// Verify a signature over a precomputed digest.
    pub fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> Result<()> {
        verify_prehash(&self.public, prehash, signature)
    }
}

/// DER-encoded SubjectPublicKeyInfo for a P-256 public key.
pub fn public_key_der(public: &VerifyingKey) -> Result<Vec<u8>> {
    public
        .to_public_key_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| ChainGenError::InvalidKeyError(format!("Failed to encode public key: {}", e)))
}

/// Verify an ECDSA signature over a precomputed digest.
pub fn verify_prehash(public: &VerifyingKey, prehash: &[u8], signature: &Signature) -> Result<()> {
    public
        .verify_prehash(prehash, signature)
        .map_err(|e| ChainGenError::CryptoError(format!("Signature verification failed: {}", e)))
}

/// Generate a new P-256 keypair from the operating system RNG.
///
/// # Example
///
/// ```
/// use chaingen::crypto::p256::generate_p256_keypair;
///
/// let keypair = generate_p256_keypair().unwrap();
/// assert_eq!(keypair.public_bytes().len(), 65);
/// ```
pub fn generate_p256_keypair() -> Result<Keypair> {
    let secret = SigningKey::random(&mut OsRng);
    Ok(Keypair::from_secret(secret))
}

/// Import a P-256 keypair from a 32-byte big-endian secret scalar.
///
/// # Example
///
/// ```
/// use chaingen::crypto::p256::{generate_p256_keypair, import_p256_from_bytes};
///
/// let keypair = generate_p256_keypair().unwrap();
/// let imported = import_p256_from_bytes(&keypair.secret_bytes()).unwrap();
/// assert_eq!(keypair.public_bytes(), imported.public_bytes());
/// ```
pub fn import_p256_from_bytes(bytes: &[u8]) -> Result<Keypair> {
    if bytes.len() != 32 {
        return Err(ChainGenError::InvalidKeyError(format!(
            "Expected 32 bytes for P-256 secret key, got {}",
            bytes.len()
        )));
    }

    let secret = SigningKey::from_slice(bytes)
        .map_err(|e| ChainGenError::InvalidKeyError(format!("Invalid P-256 scalar: {}", e)))?;
    Ok(Keypair::from_secret(secret))
}
