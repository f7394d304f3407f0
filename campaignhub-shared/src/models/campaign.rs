/// Campaign model and database operations
///
/// A campaign belongs to one user and owns zero or more campaign tasks.
///
/// # Status
///
/// ```text
/// draft | active | paused | completed
/// ```
///
/// There is no enforced transition graph: any status may replace any other.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE campaign_status AS ENUM ('draft', 'active', 'paused', 'completed');
///
/// CREATE TABLE campaigns (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     status campaign_status NOT NULL DEFAULT 'draft',
///     campaign_data JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgExecutor;
use std::fmt;
use std::str::FromStr;

/// Campaign lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "campaign_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Being put together, not yet live
    #[default]
    Draft,

    /// Live
    Active,

    /// Temporarily stopped
    Paused,

    /// Finished
    Completed,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 4] = [
        CampaignStatus::Draft,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known campaign status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}' (expected one of: draft, active, paused, completed)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for CampaignStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        CampaignStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Campaign model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Campaign {
    /// Auto-incremented campaign ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Campaign name
    pub name: String,

    /// Current status
    pub status: CampaignStatus,

    /// Free-form campaign-specific attributes
    pub campaign_data: Option<JsonValue>,

    /// When the campaign was created
    pub created_at: DateTime<Utc>,

    /// When the campaign was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new campaign
#[derive(Debug, Clone)]
pub struct CreateCampaign {
    pub user_id: i64,
    pub name: String,
    pub status: CampaignStatus,
    pub campaign_data: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

/// Input for updating an existing campaign
///
/// Only `Some` fields are written. `campaign_data: Some(None)` clears the bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateCampaign {
    pub name: Option<String>,
    pub status: Option<CampaignStatus>,
    pub campaign_data: Option<Option<JsonValue>>,
}

impl UpdateCampaign {
    /// True when no column besides `updated_at` would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && self.campaign_data.is_none()
    }
}

const CAMPAIGN_COLUMNS: &str = "id, user_id, name, status, campaign_data, created_at, updated_at";

impl Campaign {
    /// Inserts a campaign
    ///
    /// # Errors
    ///
    /// Fails with a foreign-key violation if `user_id` does not reference a user.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateCampaign,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (user_id, name, status, campaign_data, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {}",
            CAMPAIGN_COLUMNS
        );

        sqlx::query_as::<_, Campaign>(&query)
            .bind(data.user_id)
            .bind(data.name)
            .bind(data.status)
            .bind(data.campaign_data)
            .bind(data.created_at)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM campaigns WHERE id = $1", CAMPAIGN_COLUMNS);

        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Whether a campaign with this id exists
    pub async fn exists(executor: impl PgExecutor<'_>, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM campaigns WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// Campaigns owned by a user, in insertion order
    pub async fn list_by_user(
        executor: impl PgExecutor<'_>,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM campaigns WHERE user_id = $1 ORDER BY id ASC",
            CAMPAIGN_COLUMNS
        );

        sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Applies `data` and sets `updated_at = now`
    ///
    /// Returns None if the campaign doesn't exist.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: i64,
        data: UpdateCampaign,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        // $1 = id, $2 = updated_at, then one placeholder per present field
        let mut query = String::from("UPDATE campaigns SET updated_at = $2");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.campaign_data.is_some() {
            bind_count += 1;
            query.push_str(&format!(", campaign_data = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", CAMPAIGN_COLUMNS));

        let mut q = sqlx::query_as::<_, Campaign>(&query).bind(id).bind(now);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(campaign_data) = data.campaign_data {
            q = q.bind(campaign_data);
        }

        q.fetch_optional(executor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default_is_draft() {
        assert_eq!(CampaignStatus::default(), CampaignStatus::Draft);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("active".parse::<CampaignStatus>(), Ok(CampaignStatus::Active));
        assert_eq!(" Paused ".parse::<CampaignStatus>(), Ok(CampaignStatus::Paused));
        assert_eq!("COMPLETED".parse::<CampaignStatus>(), Ok(CampaignStatus::Completed));
        assert_eq!(
            "archived".parse::<CampaignStatus>(),
            Err(UnknownStatus("archived".to_string()))
        );
    }

    #[test]
    fn test_status_round_trips_through_display() {
        for status in CampaignStatus::ALL {
            assert_eq!(status.to_string().parse::<CampaignStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_value(CampaignStatus::Paused).unwrap();
        assert_eq!(json, serde_json::json!("paused"));
    }

    #[test]
    fn test_update_campaign_default_is_empty() {
        assert!(UpdateCampaign::default().is_empty());

        let update = UpdateCampaign {
            campaign_data: Some(None),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
