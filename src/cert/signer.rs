//! Certificate signing by CA entities.
//!
//! Every public signing operation funnels through [`Entity::issue`], which
//! checks the issuer is a CA, takes the next serial from its counter and
//! hands an [`IssuanceRequest`] to the issuance primitive. Requests are built
//! from a copy of the child's template, so the child can be signed again, by
//! the same or another CA, without interference.

use crate::cert::algorithm::SignatureAlgorithm;
use crate::cert::entity::Entity;
use crate::cert::template::Template;
use crate::cert::x509_signing::create_certificate;
use crate::crypto::p256::CURVE_NAME;
use crate::error::{ChainGenError, Result};
use p256::ecdsa::VerifyingKey;

/// An immutable description of one certificate to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRequest {
    template: Template,
}

impl IssuanceRequest {
    /// Start a request from a copy of `template`.
    pub fn from_template(template: &Template) -> Self {
        Self {
            template: template.clone(),
        }
    }

    /// Override the signature algorithm on this request only.
    pub fn with_signature_algorithm(self, algorithm: SignatureAlgorithm) -> Self {
        Self {
            template: self.template.with_signature_algorithm(algorithm),
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The algorithm the certificate will be signed with.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.template.signature_algorithm().unwrap_or_default()
    }
}

impl Entity {
    /// Issue a certificate for `request`, binding it to `public_key`.
    ///
    /// The serial counter only advances once the request has passed the
    /// issuer and algorithm checks.
    pub fn issue(
        &mut self,
        request: IssuanceRequest,
        public_key: &VerifyingKey,
    ) -> Result<Vec<u8>> {
        self.ensure_ca()?;

        let algorithm = request.signature_algorithm();
        if !algorithm.is_ecdsa() {
            return Err(ChainGenError::UnsupportedAlgorithm {
                algorithm: algorithm.to_string(),
                key: CURVE_NAME.to_string(),
            });
        }

        let serial = self.next_serial()?;
        let der = create_certificate(
            request.template(),
            serial,
            &self.template,
            public_key,
            &self.keypair,
        )?;

        log::debug!(
            "Issued serial {} for {} by {} ({})",
            serial,
            request.template().subject(),
            self.name(),
            algorithm
        );

        Ok(der)
    }

    /// Sign a raw template and public key.
    pub fn sign_template(
        &mut self,
        template: &Template,
        public_key: &VerifyingKey,
    ) -> Result<Vec<u8>> {
        self.issue(IssuanceRequest::from_template(template), public_key)
    }

    /// Sign `child` with its own template and public key.
    ///
    /// # Example
    ///
    /// ```
    /// use chaingen::cert::entity::Entity;
    ///
    /// # fn example() -> chaingen::error::Result<()> {
    /// let mut root = Entity::new_ca("root")?;
    /// let leaf = Entity::new("leaf")?;
    ///
    /// let first = root.sign(&leaf)?;
    /// let second = root.sign(&leaf)?;
    /// assert_ne!(first, second);
    /// # Ok(())
    /// # }
    /// ```
    pub fn sign(&mut self, child: &Entity) -> Result<Vec<u8>> {
        self.sign_template(&child.template, &child.public_key())
    }

    /// Sign `child` with a specific signature algorithm.
    ///
    /// Only the algorithm changes; subject, validity and issuer match what
    /// [`Entity::sign`] would produce.
    pub fn sign_with_algorithm(
        &mut self,
        child: &Entity,
        algorithm: SignatureAlgorithm,
    ) -> Result<Vec<u8>> {
        let request =
            IssuanceRequest::from_template(&child.template).with_signature_algorithm(algorithm);
        self.issue(request, &child.public_key())
    }

    /// Issue this CA's own self-signed certificate.
    pub fn sign_self(&mut self) -> Result<Vec<u8>> {
        let request = IssuanceRequest::from_template(&self.template);
        let public_key = self.public_key();
        self.issue(request, &public_key)
    }
}
