//! Credential Hasher
//!
//! Turns plaintext credentials into storable hashes and checks candidates
//! against stored hashes.
//!
//! ## Logging
//! Plaintext, salts, digests and stored hashes are never logged. Events carry
//! the algorithm, work factor, elapsed time and failure category only.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use zeroize::Zeroizing;

use crate::config::HasherConfig;
use crate::crypto::{OsSaltSource, SaltSource, generate_salt};
use crate::error::{CredentialError, CredentialResult};
use crate::hash::CredentialHash;
use crate::scheme::{self, ParsedHash};

/// Hashes and verifies credentials with a fixed configuration
///
/// Cloning is cheap; clones share the configuration read-only.
///
/// ## Examples
/// ```rust
/// use credential::{CredentialHasher, HasherConfig};
///
/// let config = HasherConfig::default().with_range(4, 12).with_work_factor(4);
/// let hasher = CredentialHasher::new(config)?;
///
/// let stored = hasher.hash("Str0ngP@ss!", 4)?;
/// assert!(hasher.verify("Str0ngP@ss!", &stored)?);
/// assert!(!hasher.verify("wrong", &stored)?);
/// # Ok::<(), credential::CredentialError>(())
/// ```
#[derive(Clone)]
pub struct CredentialHasher {
    inner: Arc<Inner>,
}

struct Inner {
    config: HasherConfig,
    salt_source: Box<dyn SaltSource>,
}

impl CredentialHasher {
    /// Create a hasher from a configuration, validating it first
    pub fn new(config: HasherConfig) -> CredentialResult<Self> {
        config.validate()?;

        tracing::info!(
            algorithm = %config.algorithm,
            work_factor = config.work_factor,
            min_work_factor = config.min_work_factor,
            max_work_factor = config.max_work_factor,
            "Credential hasher configured"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                salt_source: Box::new(OsSaltSource),
            }),
        })
    }

    /// Replace the salt source
    pub fn with_salt_source(self, source: impl SaltSource) -> Self {
        Self {
            inner: Arc::new(Inner {
                config: self.inner.config.clone(),
                salt_source: Box::new(source),
            }),
        }
    }

    pub fn config(&self) -> &HasherConfig {
        &self.inner.config
    }

    // ========================================================================
    // Hashing
    // ========================================================================

    /// Hash `plaintext` with an explicit work factor
    ///
    /// ## Errors
    /// - `EmptyCredential` if `plaintext` is empty
    /// - `CredentialTooLong` if bcrypt would not read all of `plaintext`
    /// - `Configuration` if `work_factor` is outside the configured range
    /// - `HashingFailure` if the random source or the digest primitive fails
    pub fn hash(&self, plaintext: &str, work_factor: u32) -> CredentialResult<CredentialHash> {
        self.hash_inner(plaintext, work_factor).inspect_err(|e| e.log())
    }

    /// Hash `plaintext` with the configured default work factor
    pub fn hash_default(&self, plaintext: &str) -> CredentialResult<CredentialHash> {
        self.hash(plaintext, self.inner.config.work_factor)
    }

    fn hash_inner(&self, plaintext: &str, work_factor: u32) -> CredentialResult<CredentialHash> {
        if plaintext.is_empty() {
            return Err(CredentialError::EmptyCredential);
        }

        let config = &self.inner.config;
        config.check_work_factor(work_factor)?;

        let salt = generate_salt(self.inner.salt_source.as_ref())
            .map_err(|e| CredentialError::HashingFailure(format!("random source failed: {e}")))?;

        let start = Instant::now();
        let encoded = scheme::hash(config, plaintext.as_bytes(), work_factor, salt)?;

        // The encoder must produce something verify can read back
        if scheme::parse(&encoded).is_err() {
            return Err(CredentialError::HashingFailure(
                "encoder produced an unreadable hash".to_string(),
            ));
        }

        tracing::debug!(
            algorithm = %config.algorithm,
            work_factor,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Credential hashed"
        );

        Ok(CredentialHash::new(encoded))
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Check `candidate` against a stored hash
    ///
    /// The stored hash supplies algorithm, work factor and salt. Digests are
    /// compared in constant time.
    ///
    /// ## Returns
    /// - `Ok(true)` if the candidate matches
    /// - `Ok(false)` on mismatch, or if the stored hash is malformed
    /// - `Err(VerificationFailure)` if the digest primitive fails
    pub fn verify(&self, candidate: &str, stored: &CredentialHash) -> CredentialResult<bool> {
        let parsed = match scheme::parse(stored.as_str()) {
            Ok(parsed) => parsed,
            Err(reason) => {
                tracing::warn!(reason = reason.as_str(), "Stored credential hash is malformed");
                return Ok(false);
            }
        };

        if !self.within_verify_limit(&parsed) {
            tracing::warn!(
                algorithm = %parsed.algorithm(),
                work_factor = parsed.work_factor(),
                "Stored credential hash exceeds the maximum work factor"
            );
            return Ok(false);
        }

        let start = Instant::now();
        let matched = parsed
            .verify(candidate.as_bytes())
            .inspect_err(|e| e.log())?;

        tracing::debug!(
            algorithm = %parsed.algorithm(),
            work_factor = parsed.work_factor(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Credential verified"
        );

        Ok(matched)
    }

    /// Whether a stored hash should be replaced by a fresh one
    ///
    /// True for malformed hashes and for hashes whose algorithm or cost
    /// differs from the current configuration. Call after a successful
    /// `verify` while the plaintext is still at hand.
    pub fn needs_rehash(&self, stored: &CredentialHash) -> bool {
        match scheme::parse(stored.as_str()) {
            Ok(parsed) => parsed.differs_from(&self.inner.config),
            Err(_) => true,
        }
    }

    /// Stored hashes may not cost more than this hasher would ever produce
    fn within_verify_limit(&self, parsed: &ParsedHash<'_>) -> bool {
        let config = &self.inner.config;
        let algorithm = parsed.algorithm();
        let max = if algorithm == config.algorithm {
            config.max_work_factor
        } else {
            *algorithm.default_range().end()
        };
        parsed.work_factor() <= max
    }

    // ========================================================================
    // Async offload
    // ========================================================================

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_async(
        &self,
        plaintext: String,
        work_factor: u32,
    ) -> CredentialResult<CredentialHash> {
        let hasher = self.clone();
        let plaintext = Zeroizing::new(plaintext);

        tokio::task::spawn_blocking(move || hasher.hash(&plaintext, work_factor))
            .await
            .map_err(|e| {
                let err = CredentialError::HashingFailure(format!("hashing task failed: {e}"));
                err.log();
                err
            })?
    }

    /// [`hash_default`](Self::hash_default) on the blocking thread pool
    pub async fn hash_default_async(&self, plaintext: String) -> CredentialResult<CredentialHash> {
        self.hash_async(plaintext, self.inner.config.work_factor)
            .await
    }

    /// [`verify`](Self::verify) on the blocking thread pool
    pub async fn verify_async(
        &self,
        candidate: String,
        stored: CredentialHash,
    ) -> CredentialResult<bool> {
        let hasher = self.clone();
        let candidate = Zeroizing::new(candidate);

        tokio::task::spawn_blocking(move || hasher.verify(&candidate, &stored))
            .await
            .map_err(|e| {
                let err =
                    CredentialError::VerificationFailure(format!("verification task failed: {e}"));
                err.log();
                err
            })?
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
