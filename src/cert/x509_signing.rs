//! X.509 certificate issuance using x509-cert.
//!
//! This module is the certificate-issuance primitive: it turns a child
//! template, a serial number, the issuer's template and the two keys into a
//! DER-encoded, ECDSA-signed v3 certificate. Serial allocation and algorithm
//! selection happen one layer up, in [`crate::cert::signer`].

use crate::cert::algorithm::SignatureAlgorithm;
use crate::cert::template::Template;
use crate::crypto::p256::{public_key_der, Keypair};
use crate::error::{ChainGenError, Result};
use der::asn1::{BitString, OctetString, SetOfVec, UtcTime, Utf8StringRef};
use der::{DateTime, Decode, Encode};
use p256::ecdsa::VerifyingKey;
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::certificate::{Certificate, Version};
use sha1::{Digest, Sha1};
use x509_cert::ext::pkix::{BasicConstraints, SubjectKeyIdentifier};
use x509_cert::ext::Extension;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::TbsCertificate;

/// Issue a certificate for `template` signed by `issuer_keypair`.
///
/// The issuer name is taken from `issuer`, everything else about the subject
/// (name, validity, CA flags, signature algorithm) from `template`. A template
/// without a signature algorithm is signed with ECDSA-SHA256.
///
/// # Example
///
/// ```
/// use chaingen::cert::template::Template;
/// use chaingen::cert::x509_signing::create_certificate;
/// use chaingen::crypto::p256::generate_p256_keypair;
///
/// # fn example() -> chaingen::error::Result<()> {
/// let issuer_key = generate_p256_keypair()?;
/// let subject_key = generate_p256_keypair()?;
/// let der = create_certificate(
///     &Template::new("leaf")?,
///     1,
///     &Template::new("root")?,
///     &subject_key.public,
///     &issuer_key,
/// )?;
/// assert_eq!(der[0], 0x30);
/// # Ok(())
/// # }
/// ```
pub fn create_certificate(
    template: &Template,
    serial: u128,
    issuer: &Template,
    subject_public_key: &VerifyingKey,
    issuer_keypair: &Keypair,
) -> Result<Vec<u8>> {
    let algorithm = template.signature_algorithm().unwrap_or_default();
    if !algorithm.is_ecdsa() {
        return Err(ChainGenError::UnsupportedAlgorithm {
            algorithm: algorithm.to_string(),
            key: crate::crypto::p256::CURVE_NAME.to_string(),
        });
    }

    let signature_algorithm = algorithm.algorithm_identifier()?;
    let subject_public_key_info = create_subject_public_key_info(subject_public_key)?;
    let extensions = create_extensions(template, &subject_public_key_info)?;

    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: serial_number(serial)?,
        signature: signature_algorithm.clone(),
        issuer: create_rdn_sequence(issuer.common_name())?,
        validity: create_validity(template.not_before(), template.not_after())?,
        subject: create_rdn_sequence(template.common_name())?,
        subject_public_key_info,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions,
    };

    // Sign with the issuer's key, never the subject's
    let signature = sign_tbs(&tbs, algorithm, issuer_keypair)?;

    let cert = Certificate {
        tbs_certificate: tbs,
        signature_algorithm,
        signature,
    };

    cert.to_der()
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to encode certificate: {}", e)))
}

/// Decode a DER certificate.
pub fn cert_from_der(der: &[u8]) -> Result<Certificate> {
    Certificate::from_der(der)
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to decode certificate: {}", e)))
}

/// Read a certificate serial back as an integer.
pub fn serial_to_u128(serial: &SerialNumber) -> Result<u128> {
    let bytes = serial.as_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let significant = &bytes[start..];

    if significant.len() > 16 {
        return Err(ChainGenError::CertificateError(format!(
            "Serial number too large: {} bytes",
            significant.len()
        )));
    }

    Ok(significant
        .iter()
        .fold(0u128, |acc, b| (acc << 8) | u128::from(*b)))
}

/// First common name in a distinguished name, if any.
pub fn common_name(name: &RdnSequence) -> Option<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|attr| attr.oid == const_oid::db::rfc4519::CN)
        .and_then(|attr| {
            Utf8StringRef::try_from(&attr.value)
                .map(|s| s.as_str().to_string())
                .ok()
        })
}

// Helper functions

fn serial_number(serial: u128) -> Result<SerialNumber> {
    let raw = serial.to_be_bytes();
    let start = raw.iter().position(|b| *b != 0).unwrap_or(raw.len() - 1);

    // Minimal positive INTEGER content
    let mut bytes = Vec::with_capacity(17);
    if raw[start] & 0x80 != 0 {
        bytes.push(0);
    }
    bytes.extend_from_slice(&raw[start..]);

    SerialNumber::new(&bytes)
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to create serial number: {}", e)))
}

fn create_rdn_sequence(cn: &str) -> Result<RdnSequence> {
    let cn_attr = AttributeTypeAndValue {
        oid: const_oid::db::rfc4519::CN,
        value: Utf8StringRef::new(cn)
            .map_err(|e| ChainGenError::ParseError(format!("Invalid CN: {}", e)))?
            .into(),
    };

    let attr_set = SetOfVec::try_from(vec![cn_attr])
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to add attribute: {}", e)))?;

    Ok(RdnSequence(vec![RelativeDistinguishedName(attr_set)]))
}

fn create_validity(not_before: DateTime, not_after: DateTime) -> Result<Validity> {
    Ok(Validity {
        not_before: utc_time(not_before)?,
        not_after: utc_time(not_after)?,
    })
}

fn utc_time(date_time: DateTime) -> Result<Time> {
    UtcTime::from_date_time(date_time)
        .map(Time::UtcTime)
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to create validity: {}", e)))
}

fn create_subject_public_key_info(public_key: &VerifyingKey) -> Result<SubjectPublicKeyInfoOwned> {
    let der = public_key_der(public_key)?;
    SubjectPublicKeyInfoOwned::from_der(&der)
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to decode SPKI: {}", e)))
}

fn create_extensions(
    template: &Template,
    spki: &SubjectPublicKeyInfoOwned,
) -> Result<Option<Vec<Extension>>> {
    if !template.basic_constraints_valid() {
        return Ok(None);
    }

    let constraints = BasicConstraints {
        ca: template.is_ca(),
        path_len_constraint: None,
    };
    let mut extensions = vec![encode_extension(
        const_oid::db::rfc5280::ID_CE_BASIC_CONSTRAINTS,
        true,
        &constraints,
    )?];

    if template.is_ca() {
        extensions.push(encode_extension(
            const_oid::db::rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER,
            false,
            &subject_key_identifier(spki)?,
        )?);
    }

    Ok(Some(extensions))
}

/// SHA-1 of the subjectPublicKey bits (RFC 5280 section 4.2.1.2, method 1).
fn subject_key_identifier(spki: &SubjectPublicKeyInfoOwned) -> Result<SubjectKeyIdentifier> {
    let hash = Sha1::digest(spki.subject_public_key.raw_bytes());
    OctetString::new(hash.to_vec())
        .map(SubjectKeyIdentifier)
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to create key id: {}", e)))
}

fn encode_extension(
    extn_id: const_oid::ObjectIdentifier,
    critical: bool,
    value: &impl Encode,
) -> Result<Extension> {
    let value = value.to_der().map_err(|e| {
        ChainGenError::CertificateError(format!("Failed to encode extension {}: {}", extn_id, e))
    })?;

    Ok(Extension {
        extn_id,
        critical,
        extn_value: OctetString::new(value).map_err(|e| {
            ChainGenError::CertificateError(format!("Failed to wrap extension: {}", e))
        })?,
    })
}

fn sign_tbs(
    tbs: &TbsCertificate,
    algorithm: SignatureAlgorithm,
    signing_key: &Keypair,
) -> Result<BitString> {
    let tbs_der = tbs
        .to_der()
        .map_err(|e| ChainGenError::CertificateError(format!("Failed to encode TBS: {}", e)))?;

    let digest = algorithm.digest(&tbs_der)?;
    let signature = signing_key.sign_prehash(&digest)?;

    BitString::from_bytes(signature.to_der().as_bytes()).map_err(|e| {
        ChainGenError::CertificateError(format!("Failed to create signature bitstring: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::p256::generate_p256_keypair;
    use p256::ecdsa::Signature;

    fn issue(template: &Template, serial: u128) -> (Vec<u8>, Keypair) {
        let issuer_key = generate_p256_keypair().unwrap();
        let subject_key = generate_p256_keypair().unwrap();
        let mut issuer = Template::new("Root CA").unwrap();
        issuer.mark_ca();

        let der = create_certificate(template, serial, &issuer, &subject_key.public, &issuer_key)
            .unwrap();
        (der, issuer_key)
    }

    #[test]
    fn test_create_certificate_fields() {
        let template = Template::new("example.com").unwrap();
        let (der, _) = issue(&template, 42);
        let cert = cert_from_der(&der).unwrap();
        let tbs = &cert.tbs_certificate;

        assert_eq!(tbs.version, Version::V3);
        assert_eq!(serial_to_u128(&tbs.serial_number).unwrap(), 42);
        assert_eq!(common_name(&tbs.issuer).as_deref(), Some("Root CA"));
        assert_eq!(common_name(&tbs.subject).as_deref(), Some("example.com"));
        assert!(tbs.extensions.is_none());
        assert_eq!(
            cert.signature_algorithm.oid,
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256
        );
        assert_eq!(tbs.signature, cert.signature_algorithm);
    }

    #[test]
    fn test_validity_is_fixed_window() {
        let template = Template::new("example.com").unwrap();
        let (der, _) = issue(&template, 1);
        let cert = cert_from_der(&der).unwrap();
        let validity = &cert.tbs_certificate.validity;

        assert!(matches!(validity.not_before, Time::UtcTime(_)));
        assert_eq!(validity.not_before.to_unix_duration().as_secs(), 1_577_836_800);
        assert_eq!(validity.not_after.to_unix_duration().as_secs(), 1_893_456_000);
    }

    #[test]
    fn test_ca_template_gets_basic_constraints() {
        let mut template = Template::new("Intermediate CA").unwrap();
        template.mark_ca();
        let (der, _) = issue(&template, 7);
        let cert = cert_from_der(&der).unwrap();

        let extensions = cert.tbs_certificate.extensions.unwrap();
        assert_eq!(extensions.len(), 2);
        assert_eq!(
            extensions[0].extn_id,
            const_oid::db::rfc5280::ID_CE_BASIC_CONSTRAINTS
        );
        assert!(extensions[0].critical);

        let constraints = BasicConstraints::from_der(extensions[0].extn_value.as_bytes()).unwrap();
        assert!(constraints.ca);
        assert_eq!(constraints.path_len_constraint, None);
    }

    #[test]
    fn test_ca_template_gets_subject_key_identifier() {
        let mut template = Template::new("Root CA").unwrap();
        template.mark_ca();
        let (der, _) = issue(&template, 3);
        let cert = cert_from_der(&der).unwrap();
        let tbs = &cert.tbs_certificate;

        let extensions = tbs.extensions.as_ref().unwrap();
        let ski_ext = extensions
            .iter()
            .find(|ext| ext.extn_id == const_oid::db::rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER)
            .unwrap();
        assert!(!ski_ext.critical);

        let ski = SubjectKeyIdentifier::from_der(ski_ext.extn_value.as_bytes()).unwrap();
        let expected = Sha1::digest(tbs.subject_public_key_info.subject_public_key.raw_bytes());
        assert_eq!(ski.0.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_leaf_has_no_subject_key_identifier() {
        let template = Template::new("leaf").unwrap();
        let (der, _) = issue(&template, 4);
        let cert = cert_from_der(&der).unwrap();
        assert!(cert.tbs_certificate.extensions.is_none());
    }

    #[test]
    fn test_signature_verifies_with_issuer_key() {
        let template = Template::new("example.com").unwrap();
        let (der, issuer_key) = issue(&template, 9);
        let cert = cert_from_der(&der).unwrap();

        let tbs_der = cert.tbs_certificate.to_der().unwrap();
        let digest = SignatureAlgorithm::EcdsaWithSha256.digest(&tbs_der).unwrap();
        let signature = Signature::from_der(cert.signature.raw_bytes()).unwrap();

        assert!(issuer_key.verify_prehash(&digest, &signature).is_ok());
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let issuer_key = generate_p256_keypair().unwrap();
        let template = Template::new("leaf")
            .unwrap()
            .with_signature_algorithm(SignatureAlgorithm::Ed25519);

        let result = create_certificate(
            &template,
            1,
            &Template::new("root").unwrap(),
            &issuer_key.public,
            &issuer_key,
        );
        assert!(matches!(
            result,
            Err(ChainGenError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn test_serial_number_encoding() {
        for serial in [0u128, 1, 0x7f, 0x80, 0xff, 0x1_0000_0000, u128::MAX] {
            let encoded = serial_number(serial).unwrap();
            assert_eq!(serial_to_u128(&encoded).unwrap(), serial);
        }
    }

    #[test]
    fn test_common_name_missing() {
        assert_eq!(common_name(&RdnSequence(Vec::new())), None);
    }
}
