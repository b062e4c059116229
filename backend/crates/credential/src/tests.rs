//! Cross-module tests for the credential crate
//! Hash/verify properties against every supported format

#[cfg(test)]
mod hash_verify_tests {
    use crate::{CredentialError, CredentialHash, CredentialHasher, HasherConfig};

    /// bcrypt hasher accepting the costs these tests use
    fn hasher() -> CredentialHasher {
        CredentialHasher::new(HasherConfig::default().with_range(4, 10).with_work_factor(4))
            .unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = hasher();
        let stored = hasher.hash("Str0ngP@ss!", 10).unwrap();

        assert!(hasher.verify("Str0ngP@ss!", &stored).unwrap());
        assert!(!hasher.verify("wrong", &stored).unwrap());
    }

    #[test]
    fn test_hash_is_self_describing() {
        let stored = hasher().hash("Str0ngP@ss!", 10).unwrap();

        assert!(stored.as_str().starts_with("$2b$10$"));
        assert_eq!(stored.as_str().len(), 60);
        assert_eq!(stored.work_factor(), Some(10));
        assert!(!stored.as_str().contains("Str0ngP@ss!"));
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hasher = hasher();
        let first = hasher.hash("same-pw", 10).unwrap();
        let second = hasher.hash("same-pw", 10).unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same-pw", &first).unwrap());
        assert!(hasher.verify("same-pw", &second).unwrap());
    }

    #[test]
    fn test_different_passwords_do_not_cross_verify() {
        let hasher = hasher();
        let stored = hasher.hash("password-one", 4).unwrap();

        assert!(!hasher.verify("password-two", &stored).unwrap());
        assert!(!hasher.verify("password-on", &stored).unwrap());
        assert!(!hasher.verify("Password-one", &stored).unwrap());
        assert!(!hasher.verify("", &stored).unwrap());
    }

    #[test]
    fn test_unicode_password() {
        let hasher = hasher();
        let stored = hasher.hash("пароль密码🔑", 4).unwrap();

        assert!(hasher.verify("пароль密码🔑", &stored).unwrap());
        assert!(!hasher.verify("пароль密码", &stored).unwrap());
    }

    #[test]
    fn test_malformed_stored_hash_is_false() {
        let hasher = hasher();
        let valid = hasher.hash("password", 4).unwrap();
        let truncated = &valid.as_str()[..valid.as_str().len() - 10];
        let wrong_tag = valid.as_str().replacen("$2b$", "$9z$", 1);

        for stored in [
            "",
            truncated,
            wrong_tag.as_str(),
            "garbage",
            "$2b$",
            "$2b$04$",
            "$argon2id$",
            "$$$$",
            "password",
            // parseable Argon2id strings whose parameters cannot run
            "$argon2id$v=19$m=1024,t=2,p=1$AAAAAA$AAAAAAAAAAAAAAAAAAAAAA",
            "$argon2id$v=19$m=1024,t=11,p=1$AAECAwQFBgcICQoLDA0ODw$AAAAAAAAAAAAAAAAAAAAAA",
            "$argon2id$v=19$m=4,t=2,p=1$AAECAwQFBgcICQoLDA0ODw$AAAAAAAAAAAAAAAAAAAAAA",
            "$argon2id$v=19$m=2097152,t=2,p=1$AAECAwQFBgcICQoLDA0ODw$AAAAAAAAAAAAAAAAAAAAAA",
            "$argon2id$v=16$m=1024,t=2,p=1$AAECAwQFBgcICQoLDA0ODw$AAAAAAAAAAAAAAAAAAAAAA",
            "$argon2id$v=99$m=1024,t=2,p=1$AAECAwQFBgcICQoLDA0ODw$AAAAAAAAAAAAAAAAAAAAAA",
        ] {
            let result = hasher.verify("password", &CredentialHash::from_stored(stored));
            assert!(
                matches!(result, Ok(false)),
                "malformed hash {stored:?} should not verify"
            );
        }
    }

    #[test]
    fn test_out_of_range_work_factor() {
        let hasher = hasher();

        for wf in [0, 99] {
            let result = hasher.hash("password", wf);
            assert!(matches!(result, Err(CredentialError::Configuration(_))));
        }
    }

    #[test]
    fn test_hash_default_uses_configured_factor() {
        let stored = hasher().hash_default("password").unwrap();
        assert_eq!(stored.work_factor(), Some(4));
    }

    #[test]
    fn test_long_credentials_never_collide() {
        let hasher = hasher();
        let prefix = "a".repeat(72);

        let longest = hasher.hash(&prefix, 4).unwrap();
        assert!(hasher.verify(&prefix, &longest).unwrap());
        assert!(!hasher.verify(&format!("{prefix}x"), &longest).unwrap());

        let result = hasher.hash(&format!("{prefix}correct-horse"), 4);
        assert!(matches!(
            result,
            Err(CredentialError::CredentialTooLong { max: 72, .. })
        ));

        // multi-byte characters count in bytes
        let result = hasher.hash(&"é".repeat(37), 4);
        assert!(matches!(
            result,
            Err(CredentialError::CredentialTooLong { actual: 74, .. })
        ));
    }
}

#[cfg(test)]
mod compatibility_tests {
    use crate::{Algorithm, CredentialHash, CredentialHasher, HasherConfig};

    const OPENWALL_HASH: &str = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    fn bcrypt_hasher() -> CredentialHasher {
        CredentialHasher::new(HasherConfig::default().with_range(4, 10).with_work_factor(4))
            .unwrap()
    }

    fn argon2_hasher() -> CredentialHasher {
        CredentialHasher::new(
            HasherConfig::new(Algorithm::Argon2id)
                .with_range(1, 4)
                .with_work_factor(2)
                .with_argon2_memory_kib(1024),
        )
        .unwrap()
    }

    #[test]
    fn test_external_bcrypt_vector() {
        let stored = CredentialHash::from_stored(OPENWALL_HASH);
        let hasher = bcrypt_hasher();

        assert!(hasher.verify("U*U", &stored).unwrap());
        assert!(!hasher.verify("U*U*", &stored).unwrap());
    }

    #[test]
    fn test_bcrypt_version_tags() {
        let hasher = bcrypt_hasher();
        let stored = hasher.hash("password", 4).unwrap();

        for tag in ["$2a$", "$2y$"] {
            let retagged = CredentialHash::from_stored(stored.as_str().replacen("$2b$", tag, 1));
            assert!(hasher.verify("password", &retagged).unwrap(), "{tag} should verify");
            assert!(!hasher.verify("other", &retagged).unwrap());
        }

        let unknown = CredentialHash::from_stored(stored.as_str().replacen("$2b$", "$2x$", 1));
        assert!(!hasher.verify("password", &unknown).unwrap());
    }

    #[test]
    fn test_argon2id_round_trip() {
        let hasher = argon2_hasher();
        let stored = hasher.hash("Str0ngP@ss!", 2).unwrap();

        assert!(stored.as_str().starts_with("$argon2id$v=19$m=1024,t=2,p=1$"));
        assert!(hasher.verify("Str0ngP@ss!", &stored).unwrap());
        assert!(!hasher.verify("wrong", &stored).unwrap());
    }

    #[test]
    fn test_verify_across_algorithms() {
        let argon2 = argon2_hasher();
        let bcrypt = bcrypt_hasher();

        let argon2_hash = argon2.hash("password", 2).unwrap();
        let bcrypt_hash = bcrypt.hash("password", 4).unwrap();

        assert!(bcrypt.verify("password", &argon2_hash).unwrap());
        assert!(argon2.verify("password", &bcrypt_hash).unwrap());

        assert!(bcrypt.needs_rehash(&argon2_hash));
        assert!(argon2.needs_rehash(&bcrypt_hash));
    }

    #[test]
    fn test_argon2_long_credentials_are_distinct() {
        let hasher = argon2_hasher();
        let prefix = "a".repeat(72);
        let stored = hasher.hash(&format!("{prefix}correct-horse"), 2).unwrap();

        assert!(hasher.verify(&format!("{prefix}correct-horse"), &stored).unwrap());
        assert!(!hasher.verify(&format!("{prefix}x"), &stored).unwrap());
        assert!(!hasher.verify(&prefix, &stored).unwrap());
    }

    #[test]
    fn test_argon2_unrunnable_stored_hash_is_false() {
        let hasher = argon2_hasher();

        for stored in [
            "$argon2id$v=19$m=1024,t=2,p=1$AAAAAA$AAAAAAAAAAAAAAAAAAAAAA",
            "$argon2id$v=19$m=1024,t=5,p=1$AAECAwQFBgcICQoLDA0ODw$AAAAAAAAAAAAAAAAAAAAAA",
            "$argon2id$v=19$m=8,t=2,p=4$AAECAwQFBgcICQoLDA0ODw$AAAAAAAAAAAAAAAAAAAAAA",
        ] {
            let result = hasher.verify("password", &CredentialHash::from_stored(stored));
            assert!(
                matches!(result, Ok(false)),
                "stored hash {stored:?} should not verify"
            );
        }
    }

    #[test]
    fn test_argon2_memory_drift_needs_rehash() {
        let hasher = argon2_hasher();
        let stored = hasher.hash_default("password").unwrap();
        assert!(!hasher.needs_rehash(&stored));

        let bigger = CredentialHasher::new(hasher.config().clone().with_argon2_memory_kib(2048))
            .unwrap();
        assert!(bigger.needs_rehash(&stored));
        assert!(bigger.verify("password", &stored).unwrap());
    }
}

#[cfg(test)]
mod async_tests {
    use crate::{CredentialError, CredentialHasher, HasherConfig};

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(HasherConfig::default().with_range(4, 10).with_work_factor(4))
            .unwrap()
    }

    #[tokio::test]
    async fn test_async_round_trip() {
        let hasher = hasher();
        let stored = hasher.hash_async("Str0ngP@ss!".to_string(), 5).await.unwrap();

        assert!(
            hasher
                .verify_async("Str0ngP@ss!".to_string(), stored.clone())
                .await
                .unwrap()
        );
        assert!(!hasher.verify_async("wrong".to_string(), stored.clone()).await.unwrap());

        // sync and async paths agree
        assert!(hasher.verify("Str0ngP@ss!", &stored).unwrap());
    }

    #[tokio::test]
    async fn test_async_default_and_errors() {
        let hasher = hasher();
        let stored = hasher.hash_default_async("password".to_string()).await.unwrap();
        assert_eq!(stored.work_factor(), Some(4));

        let result = hasher.hash_async("password".to_string(), 99).await;
        assert!(matches!(result, Err(CredentialError::Configuration(_))));

        let result = hasher.hash_async(String::new(), 4).await;
        assert!(matches!(result, Err(CredentialError::EmptyCredential)));
    }

    #[tokio::test]
    async fn test_concurrent_hashing() {
        let hasher = hasher();
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let hasher = hasher.clone();
                tokio::spawn(async move { hasher.hash_async(format!("password-{i}"), 4).await })
            })
            .collect();

        let mut hashes = Vec::new();
        for task in tasks {
            hashes.push(task.await.unwrap().unwrap());
        }

        for (i, stored) in hashes.iter().enumerate() {
            assert!(hasher.verify(&format!("password-{i}"), stored).unwrap());
        }
    }
}

#[cfg(test)]
mod latency_tests {
    use std::time::{Duration, Instant};

    use crate::{Algorithm, CredentialHasher, HasherConfig};

    // Within an order of magnitude of the 50-500ms interactive band
    const LOWER: Duration = Duration::from_millis(5);
    const UPPER: Duration = Duration::from_secs(5);

    fn time_default_hash(config: HasherConfig) -> Duration {
        let hasher = CredentialHasher::new(config).unwrap();
        let start = Instant::now();
        let stored = hasher.hash_default("Str0ngP@ss!").unwrap();
        let elapsed = start.elapsed();
        assert!(stored.is_well_formed());
        elapsed
    }

    #[test]
    fn test_bcrypt_default_latency() {
        let elapsed = time_default_hash(HasherConfig::default());
        assert!(
            (LOWER..=UPPER).contains(&elapsed),
            "bcrypt default took {elapsed:?}"
        );
    }

    #[test]
    fn test_argon2id_default_latency() {
        let elapsed = time_default_hash(HasherConfig::new(Algorithm::Argon2id));
        assert!(
            (LOWER..=UPPER).contains(&elapsed),
            "argon2id default took {elapsed:?}"
        );
    }
}

#[cfg(test)]
mod redaction_tests {
    use crate::{CredentialError, CredentialHasher, HasherConfig};

    #[test]
    fn test_debug_output_hides_secrets() {
        let hasher =
            CredentialHasher::new(HasherConfig::default().with_range(4, 6).with_work_factor(4))
                .unwrap();
        let stored = hasher.hash("Str0ngP@ss!", 4).unwrap();

        let debug = format!("{:?} {:?} {}", hasher, stored, stored);
        assert!(!debug.contains("Str0ngP@ss!"));
        assert!(!debug.contains(stored.as_str()));
        assert!(!debug.contains(&stored.as_str()[7..29]));
    }

    #[test]
    fn test_error_messages_hide_input() {
        let hasher =
            CredentialHasher::new(HasherConfig::default().with_range(4, 6).with_work_factor(4))
                .unwrap();
        let err = hasher.hash("Str0ngP@ss!", 20).unwrap_err();

        assert!(!err.to_string().contains("Str0ngP@ss!"));
        assert!(matches!(err, CredentialError::Configuration(_)));
    }
}
