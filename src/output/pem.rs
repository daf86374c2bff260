//! PEM armor and fixture files.
//!
//! Fixture files are disposable test data, so they are created with mode
//! 0666 (before umask) on Unix, the same mode a plain file write would use.

use crate::cert::algorithm::SignatureAlgorithm;
use crate::cert::entity::Entity;
use crate::error::{ChainGenError, Result};
use pem::{EncodeConfig, LineEnding, Pem};
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// PEM tag of every block this module writes.
pub const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Suffix appended to fixture file names.
pub const PEM_SUFFIX: &str = ".pem";

/// Permission bits for fixture files.
#[cfg(unix)]
pub const FIXTURE_FILE_MODE: u32 = 0o666;

/// Wrap DER certificate bytes in a `CERTIFICATE` PEM block with LF line endings.
///
/// # Example
///
/// ```
/// use chaingen::output::pem::encode_pem;
///
/// let pem = encode_pem(&[0x30, 0x00]);
/// assert_eq!(pem, "-----BEGIN CERTIFICATE-----\nMAA=\n-----END CERTIFICATE-----\n");
/// ```
pub fn encode_pem(der: &[u8]) -> String {
    let block = Pem::new(CERTIFICATE_TAG, der.to_vec());
    pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

/// Decode a string holding exactly one `CERTIFICATE` block back to DER.
pub fn decode_pem(pem_str: &str) -> Result<Vec<u8>> {
    let blocks = pem::parse_many(pem_str)
        .map_err(|e| ChainGenError::PemError(format!("Failed to parse PEM: {}", e)))?;

    let block = match blocks.as_slice() {
        [block] => block,
        [] => return Err(ChainGenError::PemError("Empty PEM file".to_string())),
        _ => {
            return Err(ChainGenError::PemError(format!(
                "Expected one PEM block, found {}",
                blocks.len()
            )))
        }
    };

    if block.tag() != CERTIFICATE_TAG {
        return Err(ChainGenError::PemError(format!(
            "Expected {}, got {}",
            CERTIFICATE_TAG,
            block.tag()
        )));
    }

    Ok(block.contents().to_vec())
}

/// `stem` with [`PEM_SUFFIX`] appended, so `out` becomes `out.pem` and
/// `a.b` becomes `a.b.pem`.
pub fn pem_path(stem: impl AsRef<Path>) -> PathBuf {
    let mut path = OsString::from(stem.as_ref().as_os_str());
    path.push(PEM_SUFFIX);
    PathBuf::from(path)
}

/// Armor `der` and write it to `<stem>.pem`, replacing any existing file.
pub fn write_pem_file(stem: impl AsRef<Path>, der: &[u8]) -> Result<PathBuf> {
    let path = pem_path(stem);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FIXTURE_FILE_MODE);
    }

    let mut file = options.open(&path)?;
    file.write_all(encode_pem(der).as_bytes())?;
    file.sync_all()?;

    log::info!("Wrote {}", path.display());
    Ok(path)
}

/// Sign `child` with `ca` and write the result to `<stem>.pem`.
///
/// With `algorithm` set this is [`Entity::sign_with_algorithm`], otherwise
/// [`Entity::sign`].
///
/// # Example
///
/// ```rust,no_run
/// use chaingen::cert::entity::Entity;
/// use chaingen::output::pem::sign_to_file;
///
/// # fn example() -> chaingen::error::Result<()> {
/// let mut root = Entity::new_ca("root")?;
/// let leaf = Entity::new("leaf")?;
/// let path = sign_to_file(&mut root, &leaf, "leaf", None)?;
/// assert!(path.ends_with("leaf.pem"));
/// # Ok(())
/// # }
/// ```
pub fn sign_to_file(
    ca: &mut Entity,
    child: &Entity,
    stem: impl AsRef<Path>,
    algorithm: Option<SignatureAlgorithm>,
) -> Result<PathBuf> {
    let der = match algorithm {
        Some(algorithm) => ca.sign_with_algorithm(child, algorithm)?,
        None => ca.sign(child)?,
    };
    write_pem_file(stem, &der)
}
