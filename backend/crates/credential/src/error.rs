//! Credential Error Types
//!
//! A wrong password is not an error: `verify` returns `Ok(false)`.
//! Errors are reserved for misconfiguration and for faults in the
//! underlying random source or digest primitive.

use thiserror::Error;

use crate::config::Algorithm;

/// Credential-specific result type alias
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Configuration errors (fatal to the calling operation, never retried)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Algorithm identifier not supported
    #[error("Unknown hashing algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Work factor outside the configured range
    #[error("Work factor {value} for {algorithm} is outside the configured range {min}..={max}")]
    WorkFactorOutOfRange {
        algorithm: Algorithm,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Configured range is inverted or exceeds what the algorithm supports
    #[error(
        "Work factor range {min}..={max} is invalid for {algorithm} (supported {limit_min}..={limit_max})"
    )]
    InvalidWorkFactorRange {
        algorithm: Algorithm,
        min: u32,
        max: u32,
        limit_min: u32,
        limit_max: u32,
    },

    /// Argon2 memory cost below the primitive's minimum
    #[error("Argon2 memory cost must be at least {min} KiB (got {actual})")]
    MemoryCostTooLow { min: u32, actual: u32 },

    /// Argon2 memory cost above what stored hashes may ask for
    #[error("Argon2 memory cost must be at most {max} KiB (got {actual})")]
    MemoryCostTooHigh { max: u32, actual: u32 },

    /// Configuration value could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Hashing/verification errors
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Invalid configuration or out-of-range work factor
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Empty plaintext passed to `hash`
    #[error("Credential must not be empty")]
    EmptyCredential,

    /// Plaintext longer than the algorithm reads in full
    #[error("Credential must be at most {max} bytes (got {actual})")]
    CredentialTooLong { max: usize, actual: usize },

    /// Random source or digest primitive failed while hashing
    #[error("Credential hashing failed: {0}")]
    HashingFailure(String),

    /// Digest primitive failed while verifying well-formed input
    #[error("Credential verification failed: {0}")]
    VerificationFailure(String),
}

impl CredentialError {
    /// Whether this is an operator fault rather than an infrastructure fault
    pub fn is_configuration(&self) -> bool {
        matches!(self, CredentialError::Configuration(_))
    }

    /// Generic message safe to show an end user
    ///
    /// Never includes primitive error text or configuration details.
    pub fn public_message(&self) -> &'static str {
        match self {
            CredentialError::EmptyCredential => "Password is required",
            CredentialError::CredentialTooLong { .. } => "Password is too long",
            CredentialError::Configuration(_)
            | CredentialError::HashingFailure(_)
            | CredentialError::VerificationFailure(_) => {
                "Unable to process credentials at this time"
            }
        }
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            CredentialError::Configuration(e) => {
                tracing::error!(error = %e, "Credential hasher misconfigured");
            }
            CredentialError::HashingFailure(msg) => {
                tracing::error!(message = %msg, "Credential hashing primitive failed");
            }
            CredentialError::VerificationFailure(msg) => {
                tracing::error!(message = %msg, "Credential verification primitive failed");
            }
            CredentialError::EmptyCredential => {
                tracing::debug!("Empty credential rejected");
            }
            CredentialError::CredentialTooLong { max, actual } => {
                tracing::debug!(max, actual, "Overlong credential rejected");
            }
        }
    }
}
