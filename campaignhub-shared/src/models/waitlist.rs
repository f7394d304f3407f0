/// Waitlist model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE waitlist (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     is_notified BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// A pre-launch signup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct WaitlistEntry {
    pub id: i64,

    /// Normalized email, unique across the waitlist
    pub email: String,

    pub joined_at: DateTime<Utc>,

    /// Whether the launch notification has gone out
    #[serde(skip_serializing)]
    pub is_notified: bool,

    pub created_at: DateTime<Utc>,
}

const ENTRY_COLUMNS: &str = "id, email, joined_at, is_notified, created_at";

impl WaitlistEntry {
    /// Inserts an entry with `joined_at = created_at = now`
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `waitlist_email_key` if the email is
    /// already on the list.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO waitlist (email, joined_at, created_at)
             VALUES ($1, $2, $2)
             RETURNING {}",
            ENTRY_COLUMNS
        );

        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(email)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_email(
        executor: impl PgExecutor<'_>,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM waitlist WHERE email = $1", ENTRY_COLUMNS);

        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// All entries, most recent first
    pub async fn list_all(executor: impl PgExecutor<'_>) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM waitlist ORDER BY joined_at DESC, id DESC",
            ENTRY_COLUMNS
        );

        sqlx::query_as::<_, WaitlistEntry>(&query)
            .fetch_all(executor)
            .await
    }

    pub async fn count_total(executor: impl PgExecutor<'_>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM waitlist")
            .fetch_one(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notified_flag_is_not_serialized() {
        let now = Utc::now();
        let entry = WaitlistEntry {
            id: 7,
            email: "fan@example.com".to_string(),
            joined_at: now,
            is_notified: true,
            created_at: now,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["email"], "fan@example.com");
        assert!(json.get("is_notified").is_none());
        assert!(json["joined_at"].is_string());
    }
}
