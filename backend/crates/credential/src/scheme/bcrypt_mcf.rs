//! bcrypt in Modular Crypt Format
//!
//! `$2b$<cost>$<22 char salt><31 char digest>`, base64 with the bcrypt
//! alphabet. New hashes are always tagged `2b`; `2a` and `2y` are accepted
//! when verifying hashes written by other implementations.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer credentials are
//! refused when hashing and never match when verifying, so two credentials
//! sharing a 72-byte prefix cannot stand in for each other.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use bcrypt::Version;

use super::Malformed;
use crate::crypto::{SALT_LEN, constant_time_eq};
use crate::error::{CredentialError, CredentialResult};

/// Longest credential bcrypt reads in full
pub(crate) const MAX_CREDENTIAL_BYTES: usize = 72;

const SALT_CHARS: usize = 22;
const DIGEST_CHARS: usize = 31;

/// Salts from other implementations may carry non-zero trailing bits
const BCRYPT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Parsed bcrypt hash, borrowing the digest from the stored string
pub(crate) struct BcryptHash<'a> {
    tag: &'a str,
    cost: u32,
    salt: [u8; SALT_LEN],
    digest: &'a str,
}

impl BcryptHash<'_> {
    pub(crate) fn cost(&self) -> u32 {
        self.cost
    }

    fn version(&self) -> Version {
        match self.tag {
            "2a" => Version::TwoA,
            "2y" => Version::TwoY,
            _ => Version::TwoB,
        }
    }
}

/// Parse `$2x$NN$salt+digest`
pub(crate) fn parse(stored: &str) -> Result<BcryptHash<'_>, Malformed> {
    let mut parts = stored.split('$');

    if parts.next() != Some("") {
        return Err(Malformed::UnknownTag);
    }

    let tag = parts.next().ok_or(Malformed::Truncated)?;
    if !matches!(tag, "2a" | "2b" | "2y") {
        return Err(Malformed::UnknownTag);
    }

    let cost_str = parts.next().ok_or(Malformed::Truncated)?;
    if cost_str.len() != 2 || !cost_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Malformed::WorkFactor);
    }
    let cost: u32 = cost_str.parse().map_err(|_| Malformed::WorkFactor)?;
    if !crate::config::Algorithm::Bcrypt.hard_limits().contains(&cost) {
        return Err(Malformed::WorkFactor);
    }

    let rest = parts.next().ok_or(Malformed::Truncated)?;
    if parts.next().is_some() {
        return Err(Malformed::Syntax);
    }
    if rest.len() < SALT_CHARS + DIGEST_CHARS {
        return Err(Malformed::Truncated);
    }
    if rest.len() > SALT_CHARS + DIGEST_CHARS || !rest.is_ascii() {
        return Err(Malformed::Syntax);
    }

    let (salt_str, digest) = rest.split_at(SALT_CHARS);
    let salt: [u8; SALT_LEN] = BCRYPT_BASE64
        .decode(salt_str)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Malformed::Salt)?;

    if !digest.bytes().all(is_bcrypt_char) {
        return Err(Malformed::Digest);
    }

    Ok(BcryptHash {
        tag,
        cost,
        salt,
        digest,
    })
}

/// Hash `plaintext` with a caller-supplied salt
pub(crate) fn hash(plaintext: &[u8], cost: u32, salt: [u8; SALT_LEN]) -> CredentialResult<String> {
    if plaintext.len() > MAX_CREDENTIAL_BYTES {
        return Err(CredentialError::CredentialTooLong {
            max: MAX_CREDENTIAL_BYTES,
            actual: plaintext.len(),
        });
    }

    let parts = bcrypt::hash_with_salt(plaintext, cost, salt)
        .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;
    Ok(parts.format_for_version(Version::TwoB))
}

/// Recompute the digest with the stored parameters and compare in constant time
pub(crate) fn verify(candidate: &[u8], stored: &BcryptHash<'_>) -> CredentialResult<bool> {
    // Would be truncated onto a shorter credential
    if candidate.len() > MAX_CREDENTIAL_BYTES {
        return Ok(false);
    }

    let recomputed = bcrypt::hash_with_salt(candidate, stored.cost, stored.salt)
        .map_err(|e| CredentialError::VerificationFailure(e.to_string()))?
        .format_for_version(stored.version());

    let Some(digest) = recomputed
        .len()
        .checked_sub(DIGEST_CHARS)
        .and_then(|start| recomputed.get(start..))
    else {
        return Err(CredentialError::VerificationFailure(
            "bcrypt produced a short digest".to_string(),
        ));
    };

    Ok(constant_time_eq(digest.as_bytes(), stored.digest.as_bytes()))
}

impl std::fmt::Debug for BcryptHash<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BcryptHash")
            .field("tag", &self.tag)
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

fn is_bcrypt_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'/'
}
