//! Stored Credential Hash
//!
//! The string a caller persists after registration or a password change.
//! It carries algorithm, work factor, salt and digest, so verifying it needs
//! nothing else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Algorithm;
use crate::scheme;

/// Self-describing credential hash, safe to store
///
/// `Debug` and `Display` never print the hash itself; use [`as_str`] or
/// [`into_string`] when writing it to storage.
///
/// [`as_str`]: CredentialHash::as_str
/// [`into_string`]: CredentialHash::into_string
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub(crate) fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// Wrap a string loaded from storage
    ///
    /// No validation happens here: a malformed value simply never verifies.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The encoded hash, for storage
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Algorithm named by the hash tag, if the hash parses
    pub fn algorithm(&self) -> Option<Algorithm> {
        scheme::parse(&self.0).ok().map(|p| p.algorithm())
    }

    /// Work factor recorded in the hash, if the hash parses
    pub fn work_factor(&self) -> Option<u32> {
        scheme::parse(&self.0).ok().map(|p| p.work_factor())
    }

    /// Whether the hash parses as one of the supported formats
    pub fn is_well_formed(&self) -> bool {
        scheme::parse(&self.0).is_ok()
    }
}

impl AsRef<str> for CredentialHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CredentialHash> for String {
    fn from(hash: CredentialHash) -> Self {
        hash.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHash")
            .field("hash", &"[HASH]")
            .finish()
    }
}

impl fmt::Display for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[CREDENTIAL_HASH]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR_HASH: &str = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    #[test]
    fn test_inspect_stored_hash() {
        let hash = CredentialHash::from_stored(VECTOR_HASH);
        assert!(hash.is_well_formed());
        assert_eq!(hash.algorithm(), Some(Algorithm::Bcrypt));
        assert_eq!(hash.work_factor(), Some(5));
        assert_eq!(hash.as_str(), VECTOR_HASH);
    }

    #[test]
    fn test_inspect_malformed_hash() {
        let hash = CredentialHash::from_stored("not-a-hash");
        assert!(!hash.is_well_formed());
        assert_eq!(hash.algorithm(), None);
        assert_eq!(hash.work_factor(), None);
    }

    #[test]
    fn test_debug_and_display_are_redacted() {
        let hash = CredentialHash::from_stored(VECTOR_HASH);
        let debug = format!("{:?}", hash);
        let display = hash.to_string();

        assert!(!debug.contains("CCCCCCCC"));
        assert!(debug.contains("[HASH]"));
        assert_eq!(display, "[CREDENTIAL_HASH]");
    }

    #[test]
    fn test_serde_transparent() {
        let hash = CredentialHash::from_stored(VECTOR_HASH);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", VECTOR_HASH));

        let back: CredentialHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert_eq!(String::from(back), VECTOR_HASH);
    }
}
