//! Persistence seam for user approval state, with the SQLite implementation.

use async_trait::async_trait;
use tracing::instrument;

use super::User;
use crate::db::Database;

/// Data-access contract for the approval workflow.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds the user holding `token`.
    async fn find_by_token(&self, token: &str) -> Result<Option<User>, sqlx::Error>;

    /// Stores `token` on the user. Returns false if no such user exists.
    async fn set_approval_token(&self, user_id: &str, token: &str) -> Result<bool, sqlx::Error>;

    /// Marks a pending user approved at `at`. Returns false if the user was not pending.
    async fn mark_approved(&self, user_id: &str, at: &str) -> Result<bool, sqlx::Error>;

    /// Marks a pending user rejected at `at`. Returns false if the user was not pending.
    async fn mark_rejected(&self, user_id: &str, at: &str) -> Result<bool, sqlx::Error>;
}

/// User store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    db: Database,
}

impl SqliteUserStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates a pending user. Accounts are normally created by the auth
    /// provider; this is for seeding.
    ///
    /// # Errors
    ///
    /// Returns the database error, e.g. on a duplicate id.
    pub async fn create(&self, id: &str, username: &str, email: &str) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .fetch_one(self.db.pool())
        .await
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE approval_token = ?")
            .bind(token)
            .fetch_optional(self.db.pool())
            .await
    }

    #[instrument(skip(self, token))]
    async fn set_approval_token(&self, user_id: &str, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET approval_token = ? WHERE id = ?")
            .bind(token)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_approved(&self, user_id: &str, at: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET approved = 1, approved_at = ?
             WHERE id = ? AND approved = 0 AND rejected = 0",
        )
        .bind(at)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn mark_rejected(&self, user_id: &str, at: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET rejected = 1, rejected_at = ?
             WHERE id = ? AND approved = 0 AND rejected = 0",
        )
        .bind(at)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
