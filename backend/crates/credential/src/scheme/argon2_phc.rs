//! Argon2id in PHC string format
//!
//! `$argon2id$v=19$m=<KiB>,t=<iterations>,p=<lanes>$<salt>$<digest>`.
//! The iteration count `t` is the work factor.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, Version,
    password_hash::{Salt, SaltString},
};
use zeroize::Zeroizing;

use super::Malformed;
use crate::config::MAX_ARGON2_MEMORY_KIB;
use crate::crypto::constant_time_eq;
use crate::error::{CredentialError, CredentialResult};

/// Lanes used for new hashes
const PARALLELISM: u32 = 1;

/// Parsed Argon2id hash
pub(crate) struct Argon2Hash {
    params: Params,
    version: Version,
    salt: Vec<u8>,
    digest: Zeroizing<Vec<u8>>,
}

impl Argon2Hash {
    pub(crate) fn iterations(&self) -> u32 {
        self.params.t_cost()
    }

    pub(crate) fn memory_kib(&self) -> u32 {
        self.params.m_cost()
    }
}

impl std::fmt::Debug for Argon2Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hash")
            .field("params", &self.params)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Parse a PHC string, accepting only the `argon2id` identifier
pub(crate) fn parse(stored: &str) -> Result<Argon2Hash, Malformed> {
    let phc = PasswordHash::new(stored).map_err(|_| Malformed::Syntax)?;

    if phc.algorithm != Algorithm::Argon2id.ident() {
        return Err(Malformed::UnknownTag);
    }

    let version = match phc.version {
        Some(v) => Version::try_from(v).map_err(|_| Malformed::Syntax)?,
        None => Version::default(),
    };

    let params = Params::try_from(&phc).map_err(|_| Malformed::WorkFactor)?;
    if !crate::config::Algorithm::Argon2id
        .hard_limits()
        .contains(&params.t_cost())
    {
        return Err(Malformed::WorkFactor);
    }
    if params.m_cost() > MAX_ARGON2_MEMORY_KIB {
        return Err(Malformed::WorkFactor);
    }

    let salt = phc.salt.ok_or(Malformed::Truncated)?;
    let mut salt_buf = [0u8; Salt::MAX_LENGTH];
    let salt = salt
        .decode_b64(&mut salt_buf)
        .map_err(|_| Malformed::Salt)?
        .to_vec();
    if salt.len() < argon2::MIN_SALT_LEN {
        return Err(Malformed::Salt);
    }

    let digest = phc.hash.ok_or(Malformed::Truncated)?;
    let digest = Zeroizing::new(digest.as_bytes().to_vec());

    Ok(Argon2Hash {
        params,
        version,
        salt,
        digest,
    })
}

/// Hash `plaintext` with Argon2id using the given cost parameters
pub(crate) fn hash(
    plaintext: &[u8],
    iterations: u32,
    memory_kib: u32,
    salt: &[u8],
) -> CredentialResult<String> {
    let params = Params::new(memory_kib, iterations, PARALLELISM, None)
        .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let salt =
        SaltString::encode_b64(salt).map_err(|e| CredentialError::HashingFailure(e.to_string()))?;

    let hash = argon2
        .hash_password(plaintext, &salt)
        .map_err(|e| CredentialError::HashingFailure(e.to_string()))?;

    Ok(hash.to_string())
}

/// Recompute the digest with the stored parameters and compare in constant time
pub(crate) fn verify(candidate: &[u8], stored: &Argon2Hash) -> CredentialResult<bool> {
    let argon2 = Argon2::new(Algorithm::Argon2id, stored.version, stored.params.clone());

    let mut recomputed = Zeroizing::new(vec![0u8; stored.digest.len()]);
    argon2
        .hash_password_into(candidate, &stored.salt, &mut recomputed)
        .map_err(|e| CredentialError::VerificationFailure(e.to_string()))?;

    Ok(constant_time_eq(&recomputed, &stored.digest))
}
