//! Signature algorithms that may appear in issued certificates.

use crate::error::{ChainGenError, Result};
use const_oid::ObjectIdentifier;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use spki::AlgorithmIdentifierOwned;
use std::fmt;
use std::str::FromStr;

/// `ecdsa-with-SHA1` (RFC 5758 section 3.2); absent from the const-oid database.
pub const ECDSA_WITH_SHA_1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.1");

/// Signature algorithm of an X.509 certificate.
///
/// Only the ECDSA variants can be produced by a P-256 issuer. ECDSA-SHA1 is
/// weak and exists so fixtures can exercise clients that should reject it.
/// The others are
/// kept so fixtures can request them on purpose and observe the rejection, and
/// so decoded certificates can report what they carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    #[serde(rename = "ecdsa-sha1")]
    EcdsaWithSha1,
    #[serde(rename = "ecdsa-sha256")]
    EcdsaWithSha256,
    #[serde(rename = "ecdsa-sha384")]
    EcdsaWithSha384,
    #[serde(rename = "ecdsa-sha512")]
    EcdsaWithSha512,
    #[serde(rename = "sha256-rsa")]
    Sha256WithRsaEncryption,
    #[serde(rename = "ed25519")]
    Ed25519,
}

impl SignatureAlgorithm {
    /// Every known algorithm, in display order.
    pub const ALL: [SignatureAlgorithm; 6] = [
        SignatureAlgorithm::EcdsaWithSha1,
        SignatureAlgorithm::EcdsaWithSha256,
        SignatureAlgorithm::EcdsaWithSha384,
        SignatureAlgorithm::EcdsaWithSha512,
        SignatureAlgorithm::Sha256WithRsaEncryption,
        SignatureAlgorithm::Ed25519,
    ];

    /// Short kebab-case name, also accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::EcdsaWithSha1 => "ecdsa-sha1",
            SignatureAlgorithm::EcdsaWithSha256 => "ecdsa-sha256",
            SignatureAlgorithm::EcdsaWithSha384 => "ecdsa-sha384",
            SignatureAlgorithm::EcdsaWithSha512 => "ecdsa-sha512",
            SignatureAlgorithm::Sha256WithRsaEncryption => "sha256-rsa",
            SignatureAlgorithm::Ed25519 => "ed25519",
        }
    }

    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            SignatureAlgorithm::EcdsaWithSha1 => ECDSA_WITH_SHA_1,
            SignatureAlgorithm::EcdsaWithSha256 => const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
            SignatureAlgorithm::EcdsaWithSha384 => const_oid::db::rfc5912::ECDSA_WITH_SHA_384,
            SignatureAlgorithm::EcdsaWithSha512 => const_oid::db::rfc5912::ECDSA_WITH_SHA_512,
            SignatureAlgorithm::Sha256WithRsaEncryption => {
                const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION
            }
            SignatureAlgorithm::Ed25519 => const_oid::db::rfc8410::ID_ED_25519,
        }
    }

    /// Look up an algorithm by its OID.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.oid() == *oid)
    }

    /// Whether a P-256 ECDSA key can produce this algorithm.
    pub fn is_ecdsa(&self) -> bool {
        matches!(
            self,
            SignatureAlgorithm::EcdsaWithSha1
                | SignatureAlgorithm::EcdsaWithSha256
                | SignatureAlgorithm::EcdsaWithSha384
                | SignatureAlgorithm::EcdsaWithSha512
        )
    }

    /// AlgorithmIdentifier as it appears in the certificate.
    ///
    /// ECDSA identifiers omit parameters (RFC 5758).
    pub fn algorithm_identifier(&self) -> Result<AlgorithmIdentifierOwned> {
        let parameters = match self {
            SignatureAlgorithm::Sha256WithRsaEncryption => Some(
                der::Any::new(der::Tag::Null, Vec::new())
                    .map_err(|e| ChainGenError::CertificateError(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(AlgorithmIdentifierOwned {
            oid: self.oid(),
            parameters,
        })
    }

    /// Digest of `message` under the hash paired with this algorithm.
    pub fn digest(&self, message: &[u8]) -> Result<Vec<u8>> {
        match self {
            SignatureAlgorithm::EcdsaWithSha1 => Ok(Sha1::digest(message).to_vec()),
            SignatureAlgorithm::EcdsaWithSha256 | SignatureAlgorithm::Sha256WithRsaEncryption => {
                Ok(Sha256::digest(message).to_vec())
            }
            SignatureAlgorithm::EcdsaWithSha384 => Ok(Sha384::digest(message).to_vec()),
            SignatureAlgorithm::EcdsaWithSha512 => Ok(Sha512::digest(message).to_vec()),
            SignatureAlgorithm::Ed25519 => Err(ChainGenError::CryptoError(
                "Ed25519 signs the message directly, not a digest".to_string(),
            )),
        }
    }
}

impl Default for SignatureAlgorithm {
    /// The algorithm picked for a P-256 issuer when the template names none.
    fn default() -> Self {
        SignatureAlgorithm::EcdsaWithSha256
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = ChainGenError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|alg| alg.name()).collect();
                ChainGenError::ParseError(format!(
                    "Unknown signature algorithm '{}'. Use one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrip() {
        for alg in SignatureAlgorithm::ALL {
            assert_eq!(alg.name().parse::<SignatureAlgorithm>().unwrap(), alg);
        }
    }

    #[test]
    fn test_from_str_case_insensitive() {
        let alg: SignatureAlgorithm = " ECDSA-SHA384 ".parse().unwrap();
        assert_eq!(alg, SignatureAlgorithm::EcdsaWithSha384);
    }

    #[test]
    fn test_from_str_unknown() {
        let result = "md5-rsa".parse::<SignatureAlgorithm>();
        match result {
            Err(ChainGenError::ParseError(msg)) => assert!(msg.contains("ecdsa-sha256")),
            _ => panic!("Expected ParseError"),
        }
    }

    #[test]
    fn test_from_oid() {
        let oid = const_oid::db::rfc5912::ECDSA_WITH_SHA_512;
        assert_eq!(
            SignatureAlgorithm::from_oid(&oid),
            Some(SignatureAlgorithm::EcdsaWithSha512)
        );
        assert_eq!(
            SignatureAlgorithm::from_oid(&const_oid::db::rfc4519::CN),
            None
        );
    }

    #[test]
    fn test_ecdsa_sha1_is_selectable() {
        let alg: SignatureAlgorithm = "ecdsa-sha1".parse().unwrap();
        assert_eq!(alg, SignatureAlgorithm::EcdsaWithSha1);
        assert!(alg.is_ecdsa());
        assert_eq!(alg.oid().to_string(), "1.2.840.10045.4.1");
        assert_eq!(SignatureAlgorithm::from_oid(&ECDSA_WITH_SHA_1), Some(alg));

        let from_json: SignatureAlgorithm = serde_json::from_str("\"ecdsa-sha1\"").unwrap();
        assert_eq!(from_json, alg);
    }

    #[test]
    fn test_default_is_ecdsa_sha256() {
        assert_eq!(
            SignatureAlgorithm::default(),
            SignatureAlgorithm::EcdsaWithSha256
        );
    }

    #[test]
    fn test_is_ecdsa() {
        assert!(SignatureAlgorithm::EcdsaWithSha384.is_ecdsa());
        assert!(!SignatureAlgorithm::Ed25519.is_ecdsa());
        assert!(!SignatureAlgorithm::Sha256WithRsaEncryption.is_ecdsa());
    }

    #[test]
    fn test_digest_lengths() {
        let msg = b"tbs";
        assert_eq!(SignatureAlgorithm::EcdsaWithSha1.digest(msg).unwrap().len(), 20);
        assert_eq!(SignatureAlgorithm::EcdsaWithSha256.digest(msg).unwrap().len(), 32);
        assert_eq!(SignatureAlgorithm::EcdsaWithSha384.digest(msg).unwrap().len(), 48);
        assert_eq!(SignatureAlgorithm::EcdsaWithSha512.digest(msg).unwrap().len(), 64);
        assert!(SignatureAlgorithm::Ed25519.digest(msg).is_err());
    }

    #[test]
    fn test_ecdsa_identifier_has_no_parameters() {
        let id = SignatureAlgorithm::EcdsaWithSha256
            .algorithm_identifier()
            .unwrap();
        assert!(id.parameters.is_none());
        assert_eq!(id.oid, const_oid::db::rfc5912::ECDSA_WITH_SHA_256);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SignatureAlgorithm::EcdsaWithSha384).unwrap();
        assert_eq!(json, "\"ecdsa-sha384\"");

        let alg: SignatureAlgorithm = serde_json::from_str("\"ed25519\"").unwrap();
        assert_eq!(alg, SignatureAlgorithm::Ed25519);
    }
}
