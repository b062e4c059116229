//! Hasher Configuration
//!
//! Process-wide hashing parameters: algorithm choice, default work factor and
//! the range of work factors the hasher accepts. Built once at startup and
//! passed to [`CredentialHasher::new`](crate::hasher::CredentialHasher::new).

use std::env;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable selecting the algorithm (`bcrypt` or `argon2id`)
pub const ENV_ALGORITHM: &str = "CREDENTIAL_ALGORITHM";
/// Environment variable for the default work factor
pub const ENV_WORK_FACTOR: &str = "CREDENTIAL_WORK_FACTOR";
/// Environment variable for the lowest accepted work factor
pub const ENV_WORK_FACTOR_MIN: &str = "CREDENTIAL_WORK_FACTOR_MIN";
/// Environment variable for the highest accepted work factor
pub const ENV_WORK_FACTOR_MAX: &str = "CREDENTIAL_WORK_FACTOR_MAX";
/// Environment variable for the Argon2 memory cost in KiB
pub const ENV_ARGON2_MEMORY_KIB: &str = "CREDENTIAL_ARGON2_MEMORY_KIB";

/// OWASP recommended Argon2id memory cost (19 MiB)
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19 * 1024;

/// Argon2 refuses anything below 8 KiB per lane
pub const MIN_ARGON2_MEMORY_KIB: u32 = 8;

/// Largest Argon2 memory cost configured or accepted from storage (1 GiB)
pub const MAX_ARGON2_MEMORY_KIB: u32 = 1024 * 1024;

// ============================================================================
// Algorithm
// ============================================================================

/// Slow one-way function used to derive credential digests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// bcrypt; the work factor is the log2 round count
    #[default]
    Bcrypt,
    /// Argon2id; the work factor is the iteration count
    Argon2id,
}

impl Algorithm {
    /// Canonical identifier, as accepted by [`FromStr`]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Bcrypt => "bcrypt",
            Algorithm::Argon2id => "argon2id",
        }
    }

    /// Work factors the primitive itself can handle
    pub const fn hard_limits(&self) -> RangeInclusive<u32> {
        match self {
            Algorithm::Bcrypt => 4..=31,
            Algorithm::Argon2id => 1..=64,
        }
    }

    /// Default work factor (roughly 50-500ms per hash on server hardware)
    pub const fn default_work_factor(&self) -> u32 {
        match self {
            Algorithm::Bcrypt => 12,
            Algorithm::Argon2id => 3,
        }
    }

    /// Default accepted work factor range
    pub const fn default_range(&self) -> RangeInclusive<u32> {
        match self {
            Algorithm::Bcrypt => 10..=16,
            Algorithm::Argon2id => 2..=10,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(Algorithm::Bcrypt),
            "argon2id" => Ok(Algorithm::Argon2id),
            other => Err(ConfigError::UnknownAlgorithm(other.to_string())),
        }
    }
}

// ============================================================================
// Hasher Configuration
// ============================================================================

/// Hashing configuration, immutable once handed to the hasher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasherConfig {
    /// Algorithm used for new hashes
    pub algorithm: Algorithm,
    /// Work factor used by `hash_default`
    pub work_factor: u32,
    /// Lowest work factor `hash` accepts
    pub min_work_factor: u32,
    /// Highest work factor `hash` accepts; also bounds stored hashes on verify
    pub max_work_factor: u32,
    /// Argon2 memory cost in KiB (ignored for bcrypt)
    pub argon2_memory_kib: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new(Algorithm::default())
    }
}

impl HasherConfig {
    /// Defaults for the given algorithm
    pub fn new(algorithm: Algorithm) -> Self {
        let range = algorithm.default_range();
        Self {
            algorithm,
            work_factor: algorithm.default_work_factor(),
            min_work_factor: *range.start(),
            max_work_factor: *range.end(),
            argon2_memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
        }
    }

    /// Set the default work factor
    pub fn with_work_factor(mut self, work_factor: u32) -> Self {
        self.work_factor = work_factor;
        self
    }

    /// Set the accepted work factor range
    pub fn with_range(mut self, min: u32, max: u32) -> Self {
        self.min_work_factor = min;
        self.max_work_factor = max;
        self
    }

    /// Set the Argon2 memory cost
    pub fn with_argon2_memory_kib(mut self, memory_kib: u32) -> Self {
        self.argon2_memory_kib = memory_kib;
        self
    }

    /// Accepted work factor range
    pub fn range(&self) -> RangeInclusive<u32> {
        self.min_work_factor..=self.max_work_factor
    }

    /// Check internal consistency
    ///
    /// The configured range must sit inside the algorithm's hard limits and
    /// contain the default work factor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = self.algorithm.hard_limits();
        if self.min_work_factor > self.max_work_factor
            || !limits.contains(&self.min_work_factor)
            || !limits.contains(&self.max_work_factor)
        {
            return Err(ConfigError::InvalidWorkFactorRange {
                algorithm: self.algorithm,
                min: self.min_work_factor,
                max: self.max_work_factor,
                limit_min: *limits.start(),
                limit_max: *limits.end(),
            });
        }

        self.check_work_factor(self.work_factor)?;

        if self.algorithm == Algorithm::Argon2id {
            if self.argon2_memory_kib < MIN_ARGON2_MEMORY_KIB {
                return Err(ConfigError::MemoryCostTooLow {
                    min: MIN_ARGON2_MEMORY_KIB,
                    actual: self.argon2_memory_kib,
                });
            }
            if self.argon2_memory_kib > MAX_ARGON2_MEMORY_KIB {
                return Err(ConfigError::MemoryCostTooHigh {
                    max: MAX_ARGON2_MEMORY_KIB,
                    actual: self.argon2_memory_kib,
                });
            }
        }

        Ok(())
    }

    /// Reject a work factor outside the configured range (no clamping)
    pub fn check_work_factor(&self, work_factor: u32) -> Result<(), ConfigError> {
        if self.range().contains(&work_factor) {
            Ok(())
        } else {
            Err(ConfigError::WorkFactorOutOfRange {
                algorithm: self.algorithm,
                value: work_factor,
                min: self.min_work_factor,
                max: self.max_work_factor,
            })
        }
    }

    /// Build from `CREDENTIAL_*` environment variables
    ///
    /// Missing variables fall back to the selected algorithm's defaults.
    /// The result is validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (same keys as [`Self::from_env`])
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let algorithm = match lookup(ENV_ALGORITHM) {
            Some(raw) => raw.parse()?,
            None => Algorithm::default(),
        };

        let mut config = Self::new(algorithm);
        if let Some(value) = parse_u32(&lookup, ENV_WORK_FACTOR)? {
            config.work_factor = value;
        }
        if let Some(value) = parse_u32(&lookup, ENV_WORK_FACTOR_MIN)? {
            config.min_work_factor = value;
        }
        if let Some(value) = parse_u32(&lookup, ENV_WORK_FACTOR_MAX)? {
            config.max_work_factor = value;
        }
        if let Some(value) = parse_u32(&lookup, ENV_ARGON2_MEMORY_KIB)? {
            config.argon2_memory_kib = value;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_u32<F>(lookup: &F, key: &'static str) -> Result<Option<u32>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

// ============================================================================
// Tests
// ============================================================================
