//! Fixture entities.
//!
//! An [`Entity`] is a keyed identity: a P-256 keypair, a certificate template
//! and, once promoted to a CA, a serial counter. Entities are deliberately not
//! `Clone`, since a cloned CA would hand out the same serials twice.

use crate::cert::template::Template;
use crate::crypto::p256::{generate_p256_keypair, Keypair};
use crate::error::Result;
use p256::ecdsa::VerifyingKey;

/// A CA or leaf identity used to build certificate chains.
#[derive(Debug)]
pub struct Entity {
    pub(crate) keypair: Keypair,
    pub(crate) template: Template,
    /// Present only on CAs.
    pub(crate) last_serial: Option<u128>,
}

impl Entity {
    /// Create a leaf entity named `name` with a fresh P-256 key.
    ///
    /// # Example
    ///
    /// ```
    /// use chaingen::cert::entity::Entity;
    ///
    /// let leaf = Entity::new("leaf").unwrap();
    /// assert_eq!(leaf.name(), "CN=leaf");
    /// assert!(!leaf.is_ca());
    /// ```
    pub fn new(name: &str) -> Result<Self> {
        let keypair = generate_p256_keypair()?;
        let template = Template::new(name)?;
        log::debug!("Generated P-256 key for {}", template.subject());

        Ok(Self {
            keypair,
            template,
            last_serial: None,
        })
    }

    /// Public half of the entity's key.
    pub fn public_key(&self) -> VerifyingKey {
        self.keypair.public
    }

    /// Subject in RFC 4514 form, e.g. `CN=root`.
    pub fn name(&self) -> String {
        self.template.subject()
    }

    pub fn common_name(&self) -> &str {
        self.template.common_name()
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn is_ca(&self) -> bool {
        self.last_serial.is_some()
    }

    /// Most recently issued serial, or the random seed before the first issuance.
    pub fn last_serial(&self) -> Option<u128> {
        self.last_serial
    }
}
