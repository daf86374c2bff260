//! Certificate templates.
//!
//! A [`Template`] is the unsigned description of a certificate: subject,
//! validity window, CA flags and an optional signature algorithm. Entities own
//! one template each and hand out copies to the signing engine.

use crate::cert::algorithm::SignatureAlgorithm;
use crate::error::{ChainGenError, Result};
use der::DateTime;

/// Start of the validity window shared by all fixtures: 2020-01-01T00:00:00Z.
pub const NOT_BEFORE: (u16, u8, u8) = (2020, 1, 1);

/// End of the validity window shared by all fixtures: 2030-01-01T00:00:00Z.
pub const NOT_AFTER: (u16, u8, u8) = (2030, 1, 1);

/// Unsigned certificate contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    common_name: String,
    not_before: DateTime,
    not_after: DateTime,
    basic_constraints_valid: bool,
    is_ca: bool,
    signature_algorithm: Option<SignatureAlgorithm>,
}

impl Template {
    /// Create a leaf template for `common_name` with the fixed validity window.
    ///
    /// # Example
    ///
    /// ```
    /// use chaingen::cert::template::Template;
    ///
    /// let template = Template::new("leaf").unwrap();
    /// assert_eq!(template.subject(), "CN=leaf");
    /// assert!(!template.is_ca());
    /// ```
    pub fn new(common_name: &str) -> Result<Self> {
        Ok(Self {
            common_name: common_name.to_string(),
            not_before: midnight_utc(NOT_BEFORE)?,
            not_after: midnight_utc(NOT_AFTER)?,
            basic_constraints_valid: false,
            is_ca: false,
            signature_algorithm: None,
        })
    }

    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    /// Subject in RFC 4514 form, e.g. `CN=root`.
    pub fn subject(&self) -> String {
        format!("CN={}", self.common_name)
    }

    pub fn not_before(&self) -> DateTime {
        self.not_before
    }

    pub fn not_after(&self) -> DateTime {
        self.not_after
    }

    /// Whether a BasicConstraints extension is emitted for this template.
    pub fn basic_constraints_valid(&self) -> bool {
        self.basic_constraints_valid
    }

    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    /// Algorithm requested by the template, if any.
    pub fn signature_algorithm(&self) -> Option<SignatureAlgorithm> {
        self.signature_algorithm
    }

    /// Copy of this template with the signature algorithm replaced.
    pub fn with_signature_algorithm(&self, algorithm: SignatureAlgorithm) -> Self {
        Self {
            signature_algorithm: Some(algorithm),
            ..self.clone()
        }
    }

    pub(crate) fn mark_ca(&mut self) {
        self.basic_constraints_valid = true;
        self.is_ca = true;
    }
}

fn midnight_utc((year, month, day): (u16, u8, u8)) -> Result<DateTime> {
    DateTime::new(year, month, day, 0, 0, 0)
        .map_err(|e| ChainGenError::CertificateError(format!("Invalid validity date: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_template_fixed_validity() {
        let template = Template::new("leaf").unwrap();

        // 2020-01-01T00:00:00Z and 2030-01-01T00:00:00Z
        assert_eq!(template.not_before().unix_duration().as_secs(), 1_577_836_800);
        assert_eq!(template.not_after().unix_duration().as_secs(), 1_893_456_000);
    }

    #[test]
    fn test_new_template_is_not_ca() {
        let template = Template::new("leaf").unwrap();
        assert!(!template.is_ca());
        assert!(!template.basic_constraints_valid());
        assert_eq!(template.signature_algorithm(), None);
    }

    #[test]
    fn test_subject() {
        let template = Template::new("example.com").unwrap();
        assert_eq!(template.common_name(), "example.com");
        assert_eq!(template.subject(), "CN=example.com");
    }

    #[test]
    fn test_mark_ca() {
        let mut template = Template::new("root").unwrap();
        template.mark_ca();
        assert!(template.is_ca());
        assert!(template.basic_constraints_valid());
    }

    #[test]
    fn test_with_signature_algorithm_leaves_original() {
        let template = Template::new("leaf").unwrap();
        let overridden = template.with_signature_algorithm(SignatureAlgorithm::EcdsaWithSha384);

        assert_eq!(template.signature_algorithm(), None);
        assert_eq!(
            overridden.signature_algorithm(),
            Some(SignatureAlgorithm::EcdsaWithSha384)
        );
        assert_eq!(overridden.subject(), template.subject());
        assert_eq!(overridden.not_before(), template.not_before());
        assert_eq!(overridden.not_after(), template.not_after());
    }
}
