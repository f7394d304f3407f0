/// User model and database operations
///
/// A user is an artist account. Each user owns zero or more campaigns;
/// deleting a user cascades to its campaigns (and their tasks).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     artist_name VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE
/// );
/// ```
///
/// All queries take any `PgExecutor`, so they run equally against the pool
/// or inside a service transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// User model representing an artist account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Auto-incremented user ID
    pub id: i64,

    /// Normalized (trimmed, lower-cased) email, unique across users
    pub email: String,

    /// Optional display name
    pub artist_name: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// Whether the account is active
    pub is_active: bool,
}

/// Input for creating a new user
///
/// The service layer normalizes both fields before they get here.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub artist_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, email, artist_name, created_at, updated_at, is_active";

impl User {
    /// Inserts a user; `created_at` and `updated_at` both take `data.created_at`
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_email_key` if the email is taken.
    pub async fn create(executor: impl PgExecutor<'_>, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, artist_name, created_at, updated_at)
             VALUES ($1, $2, $3, $3)
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email)
            .bind(data.artist_name)
            .bind(data.created_at)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(executor: impl PgExecutor<'_>, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Exact-match lookup; pass an already normalized email
    pub async fn find_by_email(
        executor: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Whether a user with this id exists
    pub async fn exists(executor: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// All users in insertion order
    pub async fn list_all(executor: impl PgExecutor<'_>) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users ORDER BY id ASC", USER_COLUMNS);

        sqlx::query_as::<_, User>(&query).fetch_all(executor).await
    }

    /// Deletes a user and, through `ON DELETE CASCADE`, its campaigns and tasks
    ///
    /// Not exposed by any service; returns false if nothing was deleted.
    pub async fn delete(executor: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
