//! User storage abstraction and the in-memory backend.
//!
//! The Postgres backend lives in [`crate::db`].

mod memory;

pub use memory::InMemoryUserStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::user::{NewUser, UserRecord};

/// Storage failures. Absence is not an error: lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The email uniqueness constraint rejected the write.
    #[error("unique constraint violated")]
    UniqueViolation,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Row-level CRUD over users with a unique email.
///
/// Implementations must enforce email uniqueness themselves; callers treat the
/// pre-insert lookup as an optimization only.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return it with its assigned id.
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;

    /// Overwrite email, full name, phone number and birthday. Succeeds without effect
    /// when no row has `user.id`.
    async fn update(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Succeeds without effect when no row has `id`.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
