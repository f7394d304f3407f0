/// Campaign task model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE campaign_tasks (
///     id BIGSERIAL PRIMARY KEY,
///     campaign_id BIGINT NOT NULL REFERENCES campaigns(id) ON DELETE CASCADE,
///     task_name VARCHAR(255) NOT NULL,
///     description VARCHAR(1000),
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// A to-do item within a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CampaignTask {
    pub id: i64,
    pub campaign_id: i64,
    pub task_name: String,
    pub description: Option<String>,
    pub completed: bool,

    /// Set only once the task is completed
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCampaignTask {
    pub campaign_id: i64,
    pub task_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str =
    "id, campaign_id, task_name, description, completed, completed_at, created_at";

impl CampaignTask {
    pub async fn create(
        executor: impl PgExecutor<'_>,
        data: CreateCampaignTask,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaign_tasks (campaign_id, task_name, description, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, CampaignTask>(&query)
            .bind(data.campaign_id)
            .bind(data.task_name)
            .bind(data.description)
            .bind(data.created_at)
            .fetch_one(executor)
            .await
    }

    /// Tasks of one campaign, in insertion order
    pub async fn list_by_campaign(
        executor: impl PgExecutor<'_>,
        campaign_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM campaign_tasks WHERE campaign_id = $1 ORDER BY id ASC",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, CampaignTask>(&query)
            .bind(campaign_id)
            .fetch_all(executor)
            .await
    }

    /// Marks a task completed
    ///
    /// Scoped to `campaign_id` so a task can't be completed through another
    /// campaign's path. An already completed task keeps its `completed_at`.
    /// Returns None if no such task exists in that campaign.
    pub async fn mark_completed(
        executor: impl PgExecutor<'_>,
        campaign_id: i64,
        task_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE campaign_tasks
             SET completed = TRUE, completed_at = COALESCE(completed_at, $3)
             WHERE id = $1 AND campaign_id = $2
             RETURNING {}",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, CampaignTask>(&query)
            .bind(task_id)
            .bind(campaign_id)
            .bind(now)
            .fetch_optional(executor)
            .await
    }
}
