//! In-process user store. Uniqueness is checked and applied under one write lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{StoreError, UserStore};
use crate::models::user::{NewUser, UserRecord};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: HashMap<i64, UserRecord>,
    /// email -> id
    emails: HashMap<String, i64>,
}

/// Map-backed [`UserStore`] for local runs and tests. Cheap to clone; clones share data.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.emails.contains_key(&user.email) {
            return Err(StoreError::UniqueViolation);
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let record = user.into_record(id);
        inner.emails.insert(record.email.clone(), id);
        inner.users.insert(id, record.clone());
        debug!(user_id = id, "user inserted");
        Ok(record)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .emails
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn update(&self, user: &UserRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let Some(old_email) = inner.users.get(&user.id).map(|u| u.email.clone()) else {
            return Ok(());
        };
        if old_email != user.email {
            if inner.emails.contains_key(&user.email) {
                return Err(StoreError::UniqueViolation);
            }
            inner.emails.remove(&old_email);
            inner.emails.insert(user.email.clone(), user.id);
        }
        if let Some(stored) = inner.users.get_mut(&user.id) {
            stored.email = user.email.clone();
            stored.full_name = user.full_name.clone();
            stored.phone_number = user.phone_number.clone();
            stored.birthday = user.birthday.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.remove(&id) {
            inner.emails.remove(&user.email);
            debug!(user_id = id, "user deleted");
        }
        Ok(())
    }
}
