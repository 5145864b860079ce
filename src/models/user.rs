//! User record as persisted by a [`UserStore`](crate::repositories::UserStore).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A stored user. `password_hash` never leaves the service boundary populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: String,
    pub birthday: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Copy of the record with the password hash cleared.
    pub fn without_password(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

/// Insert payload; the store assigns `id`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: String,
    pub birthday: String,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    pub(crate) fn into_record(self, id: i64) -> UserRecord {
        UserRecord {
            id,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            phone_number: self.phone_number,
            birthday: self.birthday,
            created_at: self.created_at,
        }
    }
}
