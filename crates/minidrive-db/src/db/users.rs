//! Credential repository: users table and the current-session marker.

use chrono::Utc;
use minidrive_core::{DriveError, DriveResult, UserAccount};
use sqlx::Sqlite;
use std::sync::Arc;

use super::handle::DatabaseHandle;

/// Repository for the `users` and `current_session` tables.
#[derive(Clone)]
pub struct UserRepository {
    handle: Arc<DatabaseHandle>,
}

impl UserRepository {
    pub fn new(handle: Arc<DatabaseHandle>) -> Self {
        Self { handle }
    }

    /// Insert a new account. The digest is stored as given.
    #[tracing::instrument(skip(self, password_digest), fields(db.table = "users"))]
    pub async fn create(&self, user_name: &str, password_digest: &str) -> DriveResult<UserAccount> {
        let pool = self.handle.pool()?;

        let account = sqlx::query_as::<Sqlite, UserAccount>(
            r#"
            INSERT INTO users (user_name, password_digest, created_at)
            VALUES (?, ?, ?)
            RETURNING user_name, password_digest, created_at
            "#,
        )
        .bind(user_name)
        .bind(password_digest)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                DriveError::UserAlreadyExists(user_name.to_string())
            }
            other => DriveError::WriteFailed(other.to_string()),
        })?;

        tracing::info!(user_name = %account.user_name, "User registered");
        Ok(account)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users"))]
    pub async fn find(&self, user_name: &str) -> DriveResult<Option<UserAccount>> {
        let pool = self.handle.pool()?;

        sqlx::query_as::<Sqlite, UserAccount>(
            "SELECT user_name, password_digest, created_at FROM users WHERE user_name = ?",
        )
        .bind(user_name)
        .fetch_optional(pool)
        .await
        .map_err(|e| DriveError::ReadFailed(e.to_string()))
    }

    /// Mark `user_name` as the signed-in user, replacing any previous marker.
    #[tracing::instrument(skip(self), fields(db.table = "current_session"))]
    pub async fn set_current(&self, user_name: &str) -> DriveResult<()> {
        let pool = self.handle.pool()?;

        sqlx::query::<Sqlite>(
            r#"
            INSERT INTO current_session (slot, user_name, signed_in_at)
            VALUES (0, ?, ?)
            ON CONFLICT (slot) DO UPDATE SET
                user_name = excluded.user_name,
                signed_in_at = excluded.signed_in_at
            "#,
        )
        .bind(user_name)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| DriveError::WriteFailed(e.to_string()))?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "current_session"))]
    pub async fn current(&self) -> DriveResult<Option<UserAccount>> {
        let pool = self.handle.pool()?;

        sqlx::query_as::<Sqlite, UserAccount>(
            r#"
            SELECT u.user_name, u.password_digest, u.created_at
            FROM current_session s
            JOIN users u ON u.user_name = s.user_name
            WHERE s.slot = 0
            "#,
        )
        .fetch_optional(pool)
        .await
        .map_err(|e| DriveError::ReadFailed(e.to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "current_session"))]
    pub async fn clear_current(&self) -> DriveResult<()> {
        let pool = self.handle.pool()?;

        sqlx::query::<Sqlite>("DELETE FROM current_session")
            .execute(pool)
            .await
            .map_err(|e| DriveError::WriteFailed(e.to_string()))?;

        Ok(())
    }
}
