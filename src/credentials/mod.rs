//! Credential registration and verification.
//!
//! The service owns the only two user-facing operations, [`register`] and
//! [`verify`], on top of an abstract [`CredentialStore`]. Registration runs
//! its load-check-save sequence behind a write lock so two concurrent
//! signups for the same email cannot both succeed; verification is read-only
//! and takes no lock.
//!
//! [`register`]: CredentialService::register
//! [`verify`]: CredentialService::verify

pub mod hash;
pub mod store;

pub use store::{CredentialRecord, CredentialSet, CredentialStore, FileStore, MemoryStore};

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// Typed outcome contract for both operations. The HTTP boundary performs
/// the single translation to status codes.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Blank email or password; a caller error, never retried.
    #[error("email and password are required")]
    InvalidInput,
    /// Email already holds a credential record; registration never updates.
    #[error("email already registered")]
    DuplicateIdentity,
    /// Unknown email or wrong password, deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The backing store failed; a server-side fault.
    #[error("credential store failure: {0}")]
    Storage(anyhow::Error),
}

pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    write_lock: Mutex<()>,
}

impl CredentialService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Register a new email/password pair.
    ///
    /// The email is an opaque, case-sensitive key; no normalization is
    /// applied before lookup or insert.
    ///
    /// # Errors
    /// - [`CredentialError::InvalidInput`] if either value is blank after
    ///   trimming surrounding whitespace.
    /// - [`CredentialError::DuplicateIdentity`] if the email is taken.
    /// - [`CredentialError::Storage`] if hashing or persistence fails.
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<(), CredentialError> {
        if email.trim().is_empty() || password.expose_secret().trim().is_empty() {
            return Err(CredentialError::InvalidInput);
        }

        // Hold the lock across load-check-save: without it two concurrent
        // registrations could both observe "not present" and one record
        // would silently overwrite the other.
        let _guard = self.write_lock.lock().await;

        let mut set = self.store.load().map_err(CredentialError::Storage)?;

        if set.contains_key(email) {
            return Err(CredentialError::DuplicateIdentity);
        }

        let password_hash =
            hash::hash_password(password.expose_secret()).map_err(CredentialError::Storage)?;

        set.insert(email.to_string(), CredentialRecord { password_hash });
        self.store.save(&set).map_err(CredentialError::Storage)?;

        info!("New credential registered for {email}");

        Ok(())
    }

    /// Verify an email/password pair against the stored credential.
    ///
    /// Unknown email and wrong password produce the same error so callers
    /// cannot probe which emails are registered. No side effects.
    ///
    /// # Errors
    /// - [`CredentialError::InvalidCredentials`] on unknown email or
    ///   password mismatch.
    /// - [`CredentialError::Storage`] if the store cannot be read.
    pub async fn verify(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<(), CredentialError> {
        let set = self.store.load().map_err(CredentialError::Storage)?;

        let Some(record) = set.get(email) else {
            return Err(CredentialError::InvalidCredentials);
        };

        if hash::verify_password(password.expose_secret(), &record.password_hash) {
            Ok(())
        } else {
            Err(CredentialError::InvalidCredentials)
        }
    }

    /// Health probe: confirm the store is readable.
    ///
    /// # Errors
    /// Returns [`CredentialError::Storage`] if the store cannot be read.
    pub async fn ping(&self) -> Result<(), CredentialError> {
        self.store
            .load()
            .map(|_| ())
            .map_err(CredentialError::Storage)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};

    fn service() -> CredentialService {
        CredentialService::new(Arc::new(MemoryStore::new()))
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    /// Store that accepts loads but fails every save.
    struct ReadOnlyStore;

    impl CredentialStore for ReadOnlyStore {
        fn load(&self) -> Result<CredentialSet> {
            Ok(CredentialSet::new())
        }

        fn save(&self, _set: &CredentialSet) -> Result<()> {
            Err(anyhow!("medium is read-only"))
        }
    }

    /// Store whose medium cannot be read at all.
    struct BrokenStore;

    impl CredentialStore for BrokenStore {
        fn load(&self) -> Result<CredentialSet> {
            Err(anyhow!("medium unavailable"))
        }

        fn save(&self, _set: &CredentialSet) -> Result<()> {
            Err(anyhow!("medium unavailable"))
        }
    }

    #[tokio::test]
    async fn register_then_verify_succeeds() {
        let service = service();
        service
            .register("a@example.com", &secret("open sesame"))
            .await
            .unwrap();

        assert!(service
            .verify("a@example.com", &secret("open sesame"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn verify_wrong_password_is_invalid_credentials() {
        let service = service();
        service
            .register("a@example.com", &secret("open sesame"))
            .await
            .unwrap();

        let err = service
            .verify("a@example.com", &secret("wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCredentials));
    }

    #[tokio::test]
    async fn verify_unknown_email_is_invalid_credentials() {
        let err = service()
            .verify("nobody@example.com", &secret("anything"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let service = service();
        service
            .register("a@example.com", &secret("open sesame"))
            .await
            .unwrap();

        let wrong_password = service
            .verify("a@example.com", &secret("wrong"))
            .await
            .unwrap_err();
        let unknown_email = service
            .verify("b@example.com", &secret("wrong"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected_and_keeps_first_password() {
        let service = service();
        service
            .register("a@example.com", &secret("first"))
            .await
            .unwrap();

        let err = service
            .register("a@example.com", &secret("second"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateIdentity));

        assert!(service.verify("a@example.com", &secret("first")).await.is_ok());
        assert!(service
            .verify("a@example.com", &secret("second"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn blank_inputs_are_invalid() {
        let service = service();

        for (email, password) in [("", "x"), ("a@b.com", ""), (" ", " ")] {
            let err = service.register(email, &secret(password)).await.unwrap_err();
            assert!(
                matches!(err, CredentialError::InvalidInput),
                "expected InvalidInput for ({email:?}, {password:?})"
            );
        }
    }

    #[tokio::test]
    async fn email_is_an_opaque_case_sensitive_key() {
        let service = service();
        service
            .register("User@Example.com", &secret("open sesame"))
            .await
            .unwrap();

        // A differently-cased email is a different identity.
        service
            .register("user@example.com", &secret("open sesame"))
            .await
            .unwrap();

        let err = service
            .verify("USER@EXAMPLE.COM", &secret("open sesame"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCredentials));
    }

    #[tokio::test]
    async fn concurrent_registrations_for_one_email_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let service = CredentialService::new(store.clone());

        let (pw_a, pw_b, pw_c, pw_d) =
            (secret("pw-a"), secret("pw-b"), secret("pw-c"), secret("pw-d"));
        let (a, b, c, d) = tokio::join!(
            service.register("race@example.com", &pw_a),
            service.register("race@example.com", &pw_b),
            service.register("race@example.com", &pw_c),
            service.register("race@example.com", &pw_d),
        );

        let outcomes = [a, b, c, d];
        let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
        let duplicates = outcomes
            .iter()
            .filter(|outcome| {
                matches!(outcome, Err(CredentialError::DuplicateIdentity))
            })
            .count();

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 3);

        let set = store.load().unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains_key("race@example.com"));
    }

    #[tokio::test]
    async fn save_failure_surfaces_as_storage_error() {
        let service = CredentialService::new(Arc::new(ReadOnlyStore));

        let err = service
            .register("a@example.com", &secret("open sesame"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::Storage(_)));
    }

    #[tokio::test]
    async fn unreadable_store_surfaces_as_storage_error() {
        let service = CredentialService::new(Arc::new(BrokenStore));

        let register = service
            .register("a@example.com", &secret("x"))
            .await
            .unwrap_err();
        assert!(matches!(register, CredentialError::Storage(_)));

        let verify = service.verify("a@example.com", &secret("x")).await.unwrap_err();
        assert!(matches!(verify, CredentialError::Storage(_)));

        assert!(service.ping().await.is_err());
    }

    #[tokio::test]
    async fn registration_survives_a_service_restart() {
        let dir = tempfile::tempdir().unwrap();

        let service = CredentialService::new(Arc::new(FileStore::new(dir.path())));
        service
            .register("a@example.com", &secret("open sesame"))
            .await
            .unwrap();
        drop(service);

        let service = CredentialService::new(Arc::new(FileStore::new(dir.path())));
        assert!(service
            .verify("a@example.com", &secret("open sesame"))
            .await
            .is_ok());
    }
}
