//! CA promotion and serial-number sequencing.
//!
//! A CA starts its serial counter at a random value in `[0, 2^32)` so that
//! independently generated fixture CAs are unlikely to collide, then advances
//! it by exactly one per issued certificate.

use crate::cert::entity::Entity;
use crate::crypto::rng::random_u32;
use crate::error::{ChainGenError, Result};

impl Entity {
    /// Create an entity and promote it to a CA in one step.
    ///
    /// # Example
    ///
    /// ```
    /// use chaingen::cert::entity::Entity;
    ///
    /// let root = Entity::new_ca("root").unwrap();
    /// assert!(root.is_ca());
    /// assert!(root.last_serial().unwrap() < (1u128 << 32));
    /// ```
    pub fn new_ca(name: &str) -> Result<Self> {
        Entity::new(name)?.promote_to_ca()
    }

    /// Mark the template as a CA and seed the serial counter.
    ///
    /// Promoting an entity that is already a CA is rejected rather than
    /// re-seeding, which would restart its serial sequence.
    pub fn promote_to_ca(mut self) -> Result<Self> {
        if self.is_ca() {
            return Err(ChainGenError::CertificateError(format!(
                "{} is already a CA",
                self.name()
            )));
        }

        let seed = u128::from(random_u32()?);
        self.template.mark_ca();
        self.last_serial = Some(seed);
        log::debug!("Promoted {} to CA with serial seed {}", self.name(), seed);

        Ok(self)
    }

    /// Advance the serial counter by one and return the new value.
    ///
    /// Fails with [`ChainGenError::NotCaError`] on an entity that was never
    /// promoted.
    pub fn next_serial(&mut self) -> Result<u128> {
        let last = self
            .last_serial
            .ok_or_else(|| ChainGenError::NotCaError(self.name()))?;
        let next = last
            .checked_add(1)
            .ok_or_else(|| ChainGenError::SerialExhausted(self.name()))?;

        self.last_serial = Some(next);
        Ok(next)
    }

    /// Fail with [`ChainGenError::NotCaError`] unless this entity can issue.
    pub(crate) fn ensure_ca(&self) -> Result<()> {
        if self.is_ca() {
            Ok(())
        } else {
            Err(ChainGenError::NotCaError(self.name()))
        }
    }
}
