//! Chain plan execution.

use crate::cert::entity::Entity;
use crate::cert::signer::IssuanceRequest;
use crate::error::{ChainGenError, Result};
use crate::output::pem::write_pem_file;
use crate::plan::manifest::{CertificateSpec, ChainPlan};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

impl ChainPlan {
    /// Generate every entity, issue every certificate in order and write each
    /// one to `<out_dir>/<file>.pem`.
    ///
    /// Returns the written paths in plan order.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use chaingen::plan::ChainPlan;
    /// use std::path::Path;
    ///
    /// # fn example() -> chaingen::error::Result<()> {
    /// let plan = ChainPlan::standard_chain("root", Some("inter"), "leaf", None)?;
    /// let written = plan.execute(Path::new("fixtures"))?;
    /// assert_eq!(written.len(), 3);
    /// # Ok(())
    /// # }
    /// ```
    pub fn execute(&self, out_dir: &Path) -> Result<Vec<PathBuf>> {
        self.validate()?;
        fs::create_dir_all(out_dir).map_err(ChainGenError::StorageError)?;

        let mut entities = Vec::with_capacity(self.entities.len());
        let mut index = HashMap::new();
        for spec in &self.entities {
            let entity = if spec.ca {
                Entity::new_ca(&spec.name)?
            } else {
                Entity::new(&spec.name)?
            };
            index.insert(spec.name.as_str(), entities.len());
            entities.push(entity);
        }

        let mut written = Vec::with_capacity(self.certificates.len());
        for cert in &self.certificates {
            let issuer = lookup(&index, &cert.issuer)?;
            let subject = lookup(&index, &cert.subject)?;

            let der = if issuer == subject {
                let ca = &mut entities[issuer];
                let request = request_for(ca, cert);
                let public_key = ca.public_key();
                ca.issue(request, &public_key)?
            } else {
                let (ca, child) = issuer_and_subject(&mut entities, issuer, subject);
                ca.issue(request_for(child, cert), &child.public_key())?
            };

            written.push(write_pem_file(out_dir.join(&cert.file), &der)?);
        }

        Ok(written)
    }
}

fn lookup(index: &HashMap<&str, usize>, name: &str) -> Result<usize> {
    index
        .get(name)
        .copied()
        .ok_or_else(|| ChainGenError::PlanError(format!("Unknown entity: {}", name)))
}

fn request_for(subject: &Entity, cert: &CertificateSpec) -> IssuanceRequest {
    let request = IssuanceRequest::from_template(subject.template());
    match cert.algorithm {
        Some(algorithm) => request.with_signature_algorithm(algorithm),
        None => request,
    }
}

/// Borrow the issuer mutably and the subject shared; `issuer != subject`.
fn issuer_and_subject(
    entities: &mut [Entity],
    issuer: usize,
    subject: usize,
) -> (&mut Entity, &Entity) {
    if issuer < subject {
        let (low, high) = entities.split_at_mut(subject);
        (&mut low[issuer], &high[0])
    } else {
        let (low, high) = entities.split_at_mut(issuer);
        (&mut high[0], &low[subject])
    }
}
