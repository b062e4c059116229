//! Cryptographic Primitives
//!
//! Salt generation and timing-safe comparison shared by every scheme.

use std::hint::black_box;

use rand::{RngCore, rngs::OsRng};

/// Salt length in bytes (128 bits)
pub const SALT_LEN: usize = 16;

/// Source of salt bytes
///
/// Production code uses [`OsSaltSource`]. The trait exists so the hasher can
/// be handed a different source, e.g. one that fails, in tests.
pub trait SaltSource: Send + Sync + 'static {
    /// Fill `salt` with unpredictable bytes
    fn fill_salt(&self, salt: &mut [u8]) -> Result<(), rand::Error>;
}

/// Operating system CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSaltSource;

impl SaltSource for OsSaltSource {
    fn fill_salt(&self, salt: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(salt)
    }
}

/// Generate a fresh salt, propagating random source failures
pub(crate) fn generate_salt(source: &dyn SaltSource) -> Result<[u8; SALT_LEN], rand::Error> {
    let mut salt = [0u8; SALT_LEN];
    source.fill_salt(&mut salt)?;
    Ok(salt)
}

/// Constant-time comparison to prevent timing attacks
///
/// Running time depends only on the input lengths, never on where the first
/// differing byte is.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= black_box(x ^ y);
    }
    black_box(result) == 0
}
