//! Registration, authentication and profile lookup over a [`UserStore`].

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::auth::password::PasswordHasher;
use crate::models::user::{NewUser, UserRecord};
use crate::repositories::{StoreError, UserStore};

const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("{0} is required")]
    Validation(&'static str),

    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error("invalid birthday format, should be YYYY-MM-DD")]
    InvalidBirthdayFormat,

    /// Returned for both unknown email and wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error("failed to hash password")]
    HashFailure,

    #[error("failed to access user storage")]
    PersistenceFailure,
}

/// Registration input. Fields are taken as submitted; the email is normalized here.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: String,
    pub birthday: String,
}

/// Credential lifecycle over a shared store handle. Every record it returns has its
/// password hash cleared.
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    /// Verified against when the email is unknown, so both login failures cost one hash.
    dummy_hash: Option<Arc<str>>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        let dummy_hash = match hasher.hash("unused-login-placeholder") {
            Ok(hash) => Some(Arc::from(hash)),
            Err(e) => {
                error!(error = %e, "could not prepare placeholder hash");
                None
            }
        };
        Self {
            store,
            hasher,
            dummy_hash,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterUser) -> Result<UserRecord, CredentialError> {
        let email = normalize_email(&input.email);
        require(&email, "email")?;
        require(&input.password, "password")?;
        require(&input.full_name, "full name")?;
        require(&input.phone_number, "phone number")?;

        if self.store.get_by_email(&email).await.map_err(persistence)?.is_some() {
            warn!("email already registered");
            return Err(CredentialError::DuplicateEmail);
        }

        if !is_valid_birthday(&input.birthday) {
            return Err(CredentialError::InvalidBirthdayFormat);
        }

        let password_hash = self.hasher.hash(&input.password).map_err(|e| {
            error!(error = %e, "hash failed");
            CredentialError::HashFailure
        })?;

        let new_user = NewUser {
            email,
            password_hash,
            full_name: input.full_name,
            phone_number: input.phone_number,
            birthday: input.birthday,
            created_at: Utc::now(),
        };

        // A concurrent registration can pass the lookup above; the store's constraint
        // decides.
        let user = self.store.create(new_user).await.map_err(|e| match e {
            StoreError::UniqueViolation => {
                warn!("email already registered (constraint)");
                CredentialError::DuplicateEmail
            }
            other => persistence(other),
        })?;

        info!(user_id = user.id, "user registered");
        Ok(user.without_password())
    }

    #[instrument(skip(self, email, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, CredentialError> {
        let email = normalize_email(email);
        let Some(user) = self.store.get_by_email(&email).await.map_err(persistence)? else {
            if let Some(hash) = &self.dummy_hash {
                let _ = self.hasher.verify(password, hash);
            }
            warn!(email = %email, "login unknown email");
            return Err(CredentialError::InvalidCredentials);
        };

        match self.hasher.verify(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = user.id, "login invalid password");
                return Err(CredentialError::InvalidCredentials);
            }
            Err(e) => {
                error!(user_id = user.id, error = %e, "stored password hash unreadable");
                return Err(CredentialError::InvalidCredentials);
            }
        }

        info!(user_id = user.id, "user authenticated");
        Ok(user.without_password())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<UserRecord, CredentialError> {
        self.store
            .get_by_id(id)
            .await
            .map_err(persistence)?
            .map(UserRecord::without_password)
            .ok_or(CredentialError::NotFound)
    }
}

fn persistence(e: StoreError) -> CredentialError {
    error!(error = %e, "user store failure");
    CredentialError::PersistenceFailure
}

fn require(value: &str, field: &'static str) -> Result<(), CredentialError> {
    if value.trim().is_empty() {
        return Err(CredentialError::Validation(field));
    }
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Exactly `DDDD-DD-DD` and a real calendar date.
fn is_valid_birthday(value: &str) -> bool {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    shape_ok && NaiveDate::parse_from_str(value, BIRTHDAY_FORMAT).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::fast_hasher;
    use crate::repositories::InMemoryUserStore;
    use async_trait::async_trait;

    fn service_with(store: Arc<dyn UserStore>) -> CredentialService {
        CredentialService::new(store, fast_hasher())
    }

    fn service() -> (CredentialService, InMemoryUserStore) {
        let store = InMemoryUserStore::new();
        (service_with(Arc::new(store.clone())), store)
    }

    fn input(email: &str, birthday: &str) -> RegisterUser {
        RegisterUser {
            email: email.to_string(),
            password: "secret1".to_string(),
            full_name: "A B".to_string(),
            phone_number: "0812345678".to_string(),
            birthday: birthday.to_string(),
        }
    }

    /// Hides existing rows from email lookups, as a concurrent registration would see them.
    struct BlindLookup(InMemoryUserStore);

    #[async_trait]
    impl UserStore for BlindLookup {
        async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
            self.0.create(user).await
        }
        async fn get_by_email(&self, _email: &str) -> Result<Option<UserRecord>, StoreError> {
            Ok(None)
        }
        async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
            self.0.get_by_id(id).await
        }
        async fn update(&self, user: &UserRecord) -> Result<(), StoreError> {
            self.0.update(user).await
        }
        async fn delete(&self, id: i64) -> Result<(), StoreError> {
            self.0.delete(id).await
        }
    }

    struct Broken;

    #[async_trait]
    impl UserStore for Broken {
        async fn create(&self, _user: NewUser) -> Result<UserRecord, StoreError> {
            Err(StoreError::Backend("disk on fire at /var/lib/pg".to_string()))
        }
        async fn get_by_email(&self, _email: &str) -> Result<Option<UserRecord>, StoreError> {
            Ok(None)
        }
        async fn get_by_id(&self, _id: i64) -> Result<Option<UserRecord>, StoreError> {
            Err(StoreError::Backend("connection reset".to_string()))
        }
        async fn update(&self, _user: &UserRecord) -> Result<(), StoreError> {
            Ok(())
        }
        async fn delete(&self, _id: i64) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let (svc, store) = service();
        let user = svc.register(input("a@b.co", "1990-01-15")).await.unwrap();
        assert!(user.id > 0);
        assert!(user.password_hash.is_empty());
        assert_eq!(user.birthday, "1990-01-15");

        let stored = store.get_by_id(user.id).await.unwrap().unwrap();
        assert!(!stored.password_hash.is_empty());
        assert_ne!(stored.password_hash, "secret1");

        let logged_in = svc.authenticate("a@b.co", "secret1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(logged_in.password_hash.is_empty());
    }

    #[tokio::test]
    async fn email_is_normalized() {
        let (svc, _) = service();
        let user = svc.register(input("  A@B.Co ", "1990-01-15")).await.unwrap();
        assert_eq!(user.email, "a@b.co");
        assert!(svc.authenticate("a@b.co", "secret1").await.is_ok());
        assert!(svc.authenticate("A@B.CO", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (svc, store) = service();
        svc.register(input("a@b.co", "1990-01-15")).await.unwrap();

        let mut other = input("a@b.co", "2000-12-31");
        other.full_name = "Someone Else".to_string();
        other.password = "different".to_string();
        assert_eq!(
            svc.register(other).await.unwrap_err(),
            CredentialError::DuplicateEmail
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_caught_by_store_constraint() {
        let inner = InMemoryUserStore::new();
        let svc = service_with(Arc::new(BlindLookup(inner.clone())));
        svc.register(input("a@b.co", "1990-01-15")).await.unwrap();
        assert_eq!(
            svc.register(input("a@b.co", "1990-01-15")).await.unwrap_err(),
            CredentialError::DuplicateEmail
        );
        assert_eq!(inner.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_admit_one() {
        let (svc, store) = service();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.register(input("race@b.co", "1990-01-15")).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(e) => assert_eq!(e, CredentialError::DuplicateEmail),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn malformed_birthdays_are_rejected() {
        let (svc, store) = service();
        for bad in [
            "1990-1-1",
            "1990/01/15",
            "",
            "15-01-1990",
            "1990-01-15T00:00:00",
            "1990-02-30",
            "1990-13-01",
            "+990-01-15",
            " 1990-01-1",
        ] {
            let err = svc.register(input("b@b.co", bad)).await.unwrap_err();
            assert_eq!(err, CredentialError::InvalidBirthdayFormat, "birthday {bad:?}");
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn empty_required_fields_are_validation_errors() {
        let (svc, _) = service();
        let mut no_name = input("a@b.co", "1990-01-15");
        no_name.full_name = "  ".to_string();
        assert_eq!(
            svc.register(no_name).await.unwrap_err(),
            CredentialError::Validation("full name")
        );
        assert_eq!(
            svc.register(input("", "1990-01-15")).await.unwrap_err(),
            CredentialError::Validation("email")
        );
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let (svc, _) = service();
        svc.register(input("a@b.co", "1990-01-15")).await.unwrap();

        let unknown = svc.authenticate("nobody@b.co", "secret1").await.unwrap_err();
        let wrong = svc.authenticate("a@b.co", "not-it").await.unwrap_err();
        assert_eq!(unknown, wrong);
        assert_eq!(unknown, CredentialError::InvalidCredentials);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn unknown_email_path_hashes_at_configured_cost() {
        let (svc, _) = service();
        let hash = svc.dummy_hash.as_deref().expect("placeholder hash prepared");
        let parsed = argon2::PasswordHash::new(hash).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(parsed.params.get_decimal("m"), Some(8));
        assert_eq!(parsed.params.get_decimal("t"), Some(1));
        assert!(!svc.hasher.verify("secret1", hash).unwrap());
    }

    #[tokio::test]
    async fn unreadable_stored_hash_is_invalid_credentials() {
        let store = InMemoryUserStore::new();
        store
            .create(NewUser {
                email: "a@b.co".to_string(),
                password_hash: "plaintext?".to_string(),
                full_name: "A B".to_string(),
                phone_number: "0812345678".to_string(),
                birthday: "1990-01-15".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let svc = service_with(Arc::new(store));
        assert_eq!(
            svc.authenticate("a@b.co", "plaintext?").await.unwrap_err(),
            CredentialError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn get_by_id_clears_password_and_reports_missing() {
        let (svc, _) = service();
        let user = svc.register(input("a@b.co", "1990-01-15")).await.unwrap();

        let fetched = svc.get_by_id(user.id).await.unwrap();
        assert_eq!(fetched, user);
        assert!(fetched.password_hash.is_empty());

        assert_eq!(
            svc.get_by_id(user.id + 1).await.unwrap_err(),
            CredentialError::NotFound
        );
    }

    #[tokio::test]
    async fn store_failures_are_wrapped() {
        let svc = service_with(Arc::new(Broken));
        let err = svc.register(input("a@b.co", "1990-01-15")).await.unwrap_err();
        assert_eq!(err, CredentialError::PersistenceFailure);
        assert!(!err.to_string().contains("disk on fire"));

        assert_eq!(
            svc.get_by_id(1).await.unwrap_err(),
            CredentialError::PersistenceFailure
        );
    }

    #[test]
    fn birthday_shape() {
        assert!(is_valid_birthday("1990-01-15"));
        assert!(is_valid_birthday("2000-02-29"));
        assert!(!is_valid_birthday("1900-02-29"));
        assert!(!is_valid_birthday("1990-1-15"));
        assert!(!is_valid_birthday("1990-01-5"));
    }
}
