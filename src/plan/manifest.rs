//! Chain plan structures and validation.

use crate::cert::algorithm::SignatureAlgorithm;
use crate::error::{ChainGenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// An entity to construct before any signing happens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    /// Subject common name, also used to refer to the entity.
    pub name: String,

    /// Whether the entity is promoted to a CA.
    #[serde(default)]
    pub ca: bool,
}

/// One certificate to issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CertificateSpec {
    /// Name of the signing entity; must be a CA.
    pub issuer: String,

    /// Name of the entity being certified. Equal to `issuer` for a
    /// self-signed certificate.
    pub subject: String,

    /// Output file stem, relative to the output directory. `.pem` is appended.
    pub file: String,

    /// Signature algorithm override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<SignatureAlgorithm>,
}

/// Entities plus the ordered list of certificates to issue between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ChainPlan {
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub certificates: Vec<CertificateSpec>,
}

impl ChainPlan {
    /// Parse and validate a plan from JSON text.
    ///
    /// # Example
    ///
    /// ```
    /// use chaingen::plan::ChainPlan;
    ///
    /// let plan = ChainPlan::from_json(r#"{
    ///     "entities": [{"name": "root", "ca": true}, {"name": "leaf"}],
    ///     "certificates": [{"issuer": "root", "subject": "leaf", "file": "leaf"}]
    /// }"#).unwrap();
    /// assert_eq!(plan.certificates.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let plan: ChainPlan = serde_json::from_str(json).map_err(ChainGenError::JsonError)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load and validate a plan file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(ChainGenError::StorageError)?;
        Self::from_json(&contents)
    }

    /// The usual root → (intermediate →) leaf chain.
    ///
    /// The root is self-signed. `leaf_algorithm` applies to the leaf
    /// certificate only.
    pub fn standard_chain(
        root: &str,
        intermediate: Option<&str>,
        leaf: &str,
        leaf_algorithm: Option<SignatureAlgorithm>,
    ) -> Result<Self> {
        let mut plan = ChainPlan::default();
        plan.entities.push(EntitySpec {
            name: root.to_string(),
            ca: true,
        });
        plan.certificates.push(CertificateSpec {
            issuer: root.to_string(),
            subject: root.to_string(),
            file: root.to_string(),
            algorithm: None,
        });

        let mut leaf_issuer = root;
        if let Some(intermediate) = intermediate {
            plan.entities.push(EntitySpec {
                name: intermediate.to_string(),
                ca: true,
            });
            plan.certificates.push(CertificateSpec {
                issuer: root.to_string(),
                subject: intermediate.to_string(),
                file: intermediate.to_string(),
                algorithm: None,
            });
            leaf_issuer = intermediate;
        }

        plan.entities.push(EntitySpec {
            name: leaf.to_string(),
            ca: false,
        });
        plan.certificates.push(CertificateSpec {
            issuer: leaf_issuer.to_string(),
            subject: leaf.to_string(),
            file: leaf.to_string(),
            algorithm: leaf_algorithm,
        });

        plan.validate()?;
        Ok(plan)
    }

    /// Check the plan for inconsistencies before anything is generated.
    pub fn validate(&self) -> Result<()> {
        if self.entities.is_empty() {
            return Err(ChainGenError::PlanError("Plan has no entities".to_string()));
        }

        let mut is_ca: HashMap<&str, bool> = HashMap::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(ChainGenError::PlanError(
                    "Entity name cannot be empty".to_string(),
                ));
            }
            if is_ca.insert(entity.name.as_str(), entity.ca).is_some() {
                return Err(ChainGenError::PlanError(format!(
                    "Duplicate entity: {}",
                    entity.name
                )));
            }
        }

        let mut files = HashSet::new();
        for cert in &self.certificates {
            match is_ca.get(cert.issuer.as_str()) {
                None => {
                    return Err(ChainGenError::PlanError(format!(
                        "Unknown issuer: {}",
                        cert.issuer
                    )))
                }
                Some(false) => {
                    return Err(ChainGenError::PlanError(format!(
                        "Issuer {} is not a CA",
                        cert.issuer
                    )))
                }
                Some(true) => {}
            }

            if !is_ca.contains_key(cert.subject.as_str()) {
                return Err(ChainGenError::PlanError(format!(
                    "Unknown subject: {}",
                    cert.subject
                )));
            }

            if cert.file.trim().is_empty() {
                return Err(ChainGenError::PlanError(format!(
                    "Empty output file for {} -> {}",
                    cert.issuer, cert.subject
                )));
            }
            if !files.insert(cert.file.as_str()) {
                return Err(ChainGenError::PlanError(format!(
                    "Duplicate output file: {}",
                    cert.file
                )));
            }
        }

        Ok(())
    }
}
