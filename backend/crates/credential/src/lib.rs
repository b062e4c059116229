//! Credential Crate - Password Hashing Core
//!
//! Hashes plaintext credentials for storage and verifies candidates against
//! stored hashes:
//! - bcrypt (default) and Argon2id, selected by [`HasherConfig`]
//! - Self-describing hash strings (algorithm, work factor, salt, digest)
//! - Fresh 128-bit salt per hash from the OS random source
//! - Constant-time digest comparison
//!
//! ## Security Model
//! - A wrong password or a malformed stored hash is `Ok(false)`, never an error
//! - Work factors outside the configured range are rejected, never clamped
//! - Plaintext and hashes never reach the logs
//! - Async callers use the `*_async` methods, which run on the blocking pool

pub mod calibrate;
pub mod config;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod hasher;

mod scheme;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use calibrate::{CalibrationReport, CalibrationSample, LatencyBand, calibrate};
pub use config::{Algorithm, HasherConfig};
pub use crypto::{OsSaltSource, SaltSource};
pub use error::{ConfigError, CredentialError, CredentialResult};
pub use hash::CredentialHash;
pub use hasher::CredentialHasher;
