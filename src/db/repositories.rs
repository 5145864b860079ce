//! Postgres-backed [`UserStore`].

use async_trait::async_trait;
use tracing::debug;

use super::DbPool;
use crate::models::user::{NewUser, UserRecord};
use crate::repositories::{StoreError, UserStore};

const USER_COLUMNS: &str =
    "id, email, password_hash, full_name, phone_number, birthday, created_at";

/// Users table accessed through a shared pool. Uniqueness comes from the table's
/// `UNIQUE (email)` constraint.
#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_err(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation;
        }
    }
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let row = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, phone_number, birthday, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.phone_number)
        .bind(&user.birthday)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        debug!(user_id = row.id, "user inserted");
        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn update(&self, user: &UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users SET email = $1, full_name = $2, phone_number = $3, birthday = $4
            WHERE id = $5
            "#,
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.phone_number)
        .bind(&user.birthday)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }
}
