//! Stored hash formats
//!
//! Each scheme knows how to encode a fresh hash and how to parse a stored
//! string back into the parameters needed to recompute its digest.

pub(crate) mod argon2_phc;
pub(crate) mod bcrypt_mcf;

use crate::config::{Algorithm, HasherConfig};
use crate::crypto::SALT_LEN;
use crate::error::CredentialResult;

use argon2_phc::Argon2Hash;
use bcrypt_mcf::BcryptHash;

/// Why a stored string is not a usable hash
///
/// Only ever logged; `verify` turns every variant into `Ok(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Malformed {
    Empty,
    UnknownTag,
    Truncated,
    Syntax,
    WorkFactor,
    Salt,
    Digest,
}

impl Malformed {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Malformed::Empty => "empty",
            Malformed::UnknownTag => "unknown_tag",
            Malformed::Truncated => "truncated",
            Malformed::Syntax => "syntax",
            Malformed::WorkFactor => "work_factor",
            Malformed::Salt => "salt",
            Malformed::Digest => "digest",
        }
    }
}

/// A stored hash parsed into its scheme's parameters
#[derive(Debug)]
pub(crate) enum ParsedHash<'a> {
    Bcrypt(BcryptHash<'a>),
    Argon2id(Argon2Hash),
}

impl ParsedHash<'_> {
    pub(crate) fn algorithm(&self) -> Algorithm {
        match self {
            ParsedHash::Bcrypt(_) => Algorithm::Bcrypt,
            ParsedHash::Argon2id(_) => Algorithm::Argon2id,
        }
    }

    pub(crate) fn work_factor(&self) -> u32 {
        match self {
            ParsedHash::Bcrypt(h) => h.cost(),
            ParsedHash::Argon2id(h) => h.iterations(),
        }
    }

    /// Whether this hash was produced with different parameters than `config`
    /// would use today
    pub(crate) fn differs_from(&self, config: &HasherConfig) -> bool {
        if self.algorithm() != config.algorithm || self.work_factor() != config.work_factor {
            return true;
        }
        match self {
            ParsedHash::Argon2id(h) => h.memory_kib() != config.argon2_memory_kib,
            ParsedHash::Bcrypt(_) => false,
        }
    }

    pub(crate) fn verify(&self, candidate: &[u8]) -> CredentialResult<bool> {
        match self {
            ParsedHash::Bcrypt(h) => bcrypt_mcf::verify(candidate, h),
            ParsedHash::Argon2id(h) => argon2_phc::verify(candidate, h),
        }
    }
}

/// Identify the scheme by its tag and parse the rest
pub(crate) fn parse(stored: &str) -> Result<ParsedHash<'_>, Malformed> {
    if stored.is_empty() {
        return Err(Malformed::Empty);
    }
    if stored.starts_with("$2") {
        return bcrypt_mcf::parse(stored).map(ParsedHash::Bcrypt);
    }
    if stored.starts_with("$argon2") {
        return argon2_phc::parse(stored).map(ParsedHash::Argon2id);
    }
    Err(Malformed::UnknownTag)
}

/// Encode a new hash with the configured algorithm
pub(crate) fn hash(
    config: &HasherConfig,
    plaintext: &[u8],
    work_factor: u32,
    salt: [u8; SALT_LEN],
) -> CredentialResult<String> {
    match config.algorithm {
        Algorithm::Bcrypt => bcrypt_mcf::hash(plaintext, work_factor, salt),
        Algorithm::Argon2id => {
            argon2_phc::hash(plaintext, work_factor, config.argon2_memory_kib, &salt)
        }
    }
}
