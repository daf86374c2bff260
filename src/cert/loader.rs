//! Certificate loading from PEM text.
//!
//! This module reads issued certificates back, either as raw DER or as a
//! [`CertificateSummary`] of the fields fixtures care about.

use crate::cert::algorithm::SignatureAlgorithm;
use crate::cert::x509_signing::{cert_from_der, common_name, serial_to_u128};
use crate::error::{ChainGenError, Result};
use der::{Decode, Encode};
use rustls_pemfile::Item;
use std::io::Cursor;
use x509_cert::ext::pkix::BasicConstraints;

/// Load the DER body of the first certificate in a PEM string.
///
/// # Example
///
/// ```rust,no_run
/// use chaingen::cert::loader::load_certificate_from_pem;
///
/// # fn example() -> chaingen::error::Result<()> {
/// let pem = std::fs::read_to_string("leaf.pem")?;
/// let der = load_certificate_from_pem(&pem)?;
/// # Ok(())
/// # }
/// ```
pub fn load_certificate_from_pem(pem_str: &str) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(pem_str.as_bytes());

    match rustls_pemfile::read_one(&mut cursor)
        .map_err(|e| ChainGenError::PemError(format!("Failed to read PEM: {}", e)))?
    {
        Some(Item::X509Certificate(cert_der)) => Ok(cert_der.to_vec()),
        Some(_) => Err(ChainGenError::PemError(
            "PEM file does not contain a certificate".to_string(),
        )),
        None => Err(ChainGenError::PemError("Empty PEM file".to_string())),
    }
}

/// Load every certificate in a PEM string, skipping other block types.
pub fn load_certificates_from_pem(pem_str: &str) -> Result<Vec<Vec<u8>>> {
    let mut cursor = Cursor::new(pem_str.as_bytes());
    let mut certificates = Vec::new();

    loop {
        match rustls_pemfile::read_one(&mut cursor)
            .map_err(|e| ChainGenError::PemError(format!("Failed to read PEM: {}", e)))?
        {
            Some(Item::X509Certificate(cert_der)) => {
                certificates.push(cert_der.to_vec());
            }
            Some(_) => continue,
            None => break,
        }
    }

    if certificates.is_empty() {
        return Err(ChainGenError::PemError(
            "No certificates found in PEM file".to_string(),
        ));
    }

    Ok(certificates)
}

/// The fixture-relevant fields of an issued certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub serial: u128,
    pub issuer: Option<String>,
    pub subject: Option<String>,
    /// `None` when the OID is not one of [`SignatureAlgorithm::ALL`].
    pub signature_algorithm: Option<SignatureAlgorithm>,
    pub not_before: u64,
    pub not_after: u64,
    pub is_ca: bool,
    /// DER SubjectPublicKeyInfo.
    pub public_key: Vec<u8>,
}

impl CertificateSummary {
    /// Decode a DER certificate into a summary.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let cert = cert_from_der(der)?;
        let tbs = &cert.tbs_certificate;

        let mut is_ca = false;
        for ext in tbs.extensions.iter().flatten() {
            if ext.extn_id == const_oid::db::rfc5280::ID_CE_BASIC_CONSTRAINTS {
                let constraints = BasicConstraints::from_der(ext.extn_value.as_bytes())
                    .map_err(|e| {
                        ChainGenError::CertificateError(format!(
                            "Invalid basic constraints: {}",
                            e
                        ))
                    })?;
                is_ca = constraints.ca;
            }
        }

        let public_key = tbs.subject_public_key_info.to_der().map_err(|e| {
            ChainGenError::CertificateError(format!("Failed to encode SPKI: {}", e))
        })?;

        Ok(Self {
            serial: serial_to_u128(&tbs.serial_number)?,
            issuer: common_name(&tbs.issuer),
            subject: common_name(&tbs.subject),
            signature_algorithm: SignatureAlgorithm::from_oid(&cert.signature_algorithm.oid),
            not_before: tbs.validity.not_before.to_unix_duration().as_secs(),
            not_after: tbs.validity.not_after.to_unix_duration().as_secs(),
            is_ca,
            public_key,
        })
    }

    /// Decode the first certificate in a PEM string into a summary.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        Self::from_der(&load_certificate_from_pem(pem_str)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::entity::Entity;
    use crate::output::pem::encode_pem;

    #[test]
    fn test_load_certificate_from_pem() {
        let mut ca = Entity::new_ca("Test").unwrap();
        let der = ca.sign_self().unwrap();
        let pem = encode_pem(&der);

        let loaded = load_certificate_from_pem(&pem).unwrap();
        assert_eq!(loaded, der);
    }

    #[test]
    fn test_load_certificate_from_invalid_pem() {
        let result = load_certificate_from_pem("not a valid pem");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_certificates_from_pem_multiple() {
        let mut ca = Entity::new_ca("Test1").unwrap();
        let leaf = Entity::new("Test2").unwrap();

        let pem1 = encode_pem(&ca.sign_self().unwrap());
        let pem2 = encode_pem(&ca.sign(&leaf).unwrap());

        let combined_pem = format!("{}{}", pem1, pem2);
        let certs = load_certificates_from_pem(&combined_pem).unwrap();
        assert_eq!(certs.len(), 2);
    }

    #[test]
    fn test_load_certificates_from_empty_pem() {
        let result = load_certificates_from_pem("");
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_of_leaf() {
        let mut ca = Entity::new_ca("root").unwrap();
        let leaf = Entity::new("leaf").unwrap();
        let der = ca.sign(&leaf).unwrap();

        let summary = CertificateSummary::from_der(&der).unwrap();
        assert_eq!(summary.serial, ca.last_serial().unwrap());
        assert_eq!(summary.issuer.as_deref(), Some("root"));
        assert_eq!(summary.subject.as_deref(), Some("leaf"));
        assert_eq!(
            summary.signature_algorithm,
            Some(SignatureAlgorithm::EcdsaWithSha256)
        );
        assert_eq!(summary.not_before, 1_577_836_800);
        assert_eq!(summary.not_after, 1_893_456_000);
        assert!(!summary.is_ca);
    }

    #[test]
    fn test_summary_of_ca() {
        let mut ca = Entity::new_ca("root").unwrap();
        let pem = encode_pem(&ca.sign_self().unwrap());

        let summary = CertificateSummary::from_pem(&pem).unwrap();
        assert!(summary.is_ca);
        assert_eq!(summary.issuer, summary.subject);
    }
}
