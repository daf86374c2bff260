//! OS-backed randomness.

use crate::error::{ChainGenError, Result};
use rand::rngs::OsRng;
use rand::RngCore;

/// Fill `buf` from the operating system RNG.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| ChainGenError::CryptoError(format!("OS randomness unavailable: {}", e)))
}

/// Draw a value uniformly from `[0, 2^32)`.
pub fn random_u32() -> Result<u32> {
    let mut bytes = [0u8; 4];
    fill_random(&mut bytes)?;
    Ok(u32::from_be_bytes(bytes))
}
