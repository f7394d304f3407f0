//! Campaign business logic: creation, lookup, progress updates and tasks.

use chrono::Utc;
use serde_json::{Map, Value as JsonValue};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use crate::error::{is_foreign_key_violation, ServiceError, ServiceResult};
use crate::models::campaign::UnknownStatus;
use crate::models::{
    Campaign, CampaignStatus, CampaignTask, CreateCampaign, CreateCampaignTask, UpdateCampaign,
};
use crate::validation::{
    json_contains_nul, trim_optional, ValidationError, MAX_DESCRIPTION_LEN, MAX_NAME_LEN,
};

/// Fields a progress update may change; any other key is ignored
pub const MUTABLE_FIELDS: [&str; 3] = ["name", "status", "campaign_data"];

#[derive(Clone)]
pub struct CampaignService {
    pool: PgPool,
}

impl CampaignService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a campaign for `user_id`
    ///
    /// `status` defaults to draft when omitted.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the name is blank or too long, the status is unknown,
    /// or `user_id` does not reference a user. Nothing is persisted in any of
    /// those cases.
    #[instrument(skip(self, name))]
    pub async fn create_campaign(
        &self,
        user_id: i64,
        name: &str,
        status: Option<&str>,
    ) -> ServiceResult<Campaign> {
        let name = required_name(name, "Campaign name")?;
        let status = match status {
            Some(raw) => parse_status(raw)?,
            None => CampaignStatus::default(),
        };

        let mut tx = self.pool.begin().await?;

        let campaign = Campaign::create(
            &mut *tx,
            CreateCampaign {
                user_id,
                name,
                status,
                campaign_data: None,
                created_at: Utc::now(),
            },
        )
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                warn!(user_id, "Campaign owner does not exist");
                ServiceError::invalid_input("User does not exist")
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        info!(campaign_id = campaign.id, user_id, status = %campaign.status, "Campaign created");
        Ok(campaign)
    }

    #[instrument(skip(self))]
    pub async fn get_campaign(&self, id: i64) -> ServiceResult<Campaign> {
        Campaign::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Campaign"))
    }

    /// Applies the allow-listed fields of `patch` and refreshes `updated_at`
    ///
    /// Unknown keys are ignored. Concurrent updates are not coordinated:
    /// the last committed write wins.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `patch` is not an object or a known field has a bad value
    /// - `NotFound` if the campaign doesn't exist (nothing is written)
    #[instrument(skip(self, patch))]
    pub async fn update_campaign_progress(
        &self,
        id: i64,
        patch: &JsonValue,
    ) -> ServiceResult<Campaign> {
        let fields = patch
            .as_object()
            .ok_or_else(|| ServiceError::invalid_input("No data provided"))?;
        let update = campaign_update_from_patch(fields)?;

        let mut tx = self.pool.begin().await?;

        let campaign = Campaign::update(&mut *tx, id, update, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::not_found("Campaign"))?;

        tx.commit().await?;

        info!(campaign_id = campaign.id, status = %campaign.status, "Campaign updated");
        Ok(campaign)
    }

    /// Adds a task to a campaign
    ///
    /// # Errors
    ///
    /// `InvalidInput` on a blank/too long name or description, or one holding
    /// NUL; `NotFound` if
    /// the campaign doesn't exist.
    #[instrument(skip(self, task_name, description))]
    pub async fn add_task(
        &self,
        campaign_id: i64,
        task_name: &str,
        description: Option<&str>,
    ) -> ServiceResult<CampaignTask> {
        let task_name = required_name(task_name, "Task name")?;
        let description = trim_optional(description)?;
        if description
            .as_deref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
        {
            return Err(ServiceError::invalid_input(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }

        let mut tx = self.pool.begin().await?;

        let task = CampaignTask::create(
            &mut *tx,
            CreateCampaignTask {
                campaign_id,
                task_name,
                description,
                created_at: Utc::now(),
            },
        )
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                ServiceError::not_found("Campaign")
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        info!(task_id = task.id, campaign_id, "Campaign task created");
        Ok(task)
    }

    #[instrument(skip(self))]
    pub async fn list_tasks(&self, campaign_id: i64) -> ServiceResult<Vec<CampaignTask>> {
        let mut conn = self.pool.acquire().await?;

        if !Campaign::exists(&mut *conn, campaign_id).await? {
            return Err(ServiceError::not_found("Campaign"));
        }

        Ok(CampaignTask::list_by_campaign(&mut *conn, campaign_id).await?)
    }

    /// Marks a task completed; completing twice keeps the first timestamp
    #[instrument(skip(self))]
    pub async fn complete_task(&self, campaign_id: i64, task_id: i64) -> ServiceResult<CampaignTask> {
        let mut tx = self.pool.begin().await?;

        let task = CampaignTask::mark_completed(&mut *tx, campaign_id, task_id, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::not_found("Task"))?;

        tx.commit().await?;

        info!(task_id, campaign_id, "Campaign task completed");
        Ok(task)
    }
}

/// Builds a typed update from a JSON patch through the [`MUTABLE_FIELDS`] allow-list
///
/// `campaign_data: null` clears the attribute bag; any other JSON value
/// replaces it wholesale.
pub fn campaign_update_from_patch(patch: &Map<String, JsonValue>) -> ServiceResult<UpdateCampaign> {
    let mut update = UpdateCampaign::default();

    for (key, value) in patch {
        match key.as_str() {
            "name" => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| ServiceError::invalid_input("name must be a string"))?;
                update.name = Some(required_name(raw, "Campaign name")?);
            }
            "status" => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| ServiceError::invalid_input("status must be a string"))?;
                update.status = Some(parse_status(raw)?);
            }
            "campaign_data" => {
                if json_contains_nul(value) {
                    return Err(ValidationError::ContainsNul.into());
                }
                update.campaign_data = Some(match value {
                    JsonValue::Null => None,
                    other => Some(other.clone()),
                });
            }
            other => debug!(field = other, "Ignoring unknown campaign field"),
        }
    }

    Ok(update)
}

fn parse_status(raw: &str) -> ServiceResult<CampaignStatus> {
    raw.parse()
        .map_err(|e: UnknownStatus| ServiceError::invalid_input(e.to_string()))
}

fn required_name(raw: &str, what: &str) -> ServiceResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ServiceError::invalid_input(format!("{} is required", what)));
    }
    if name.contains('\0') {
        return Err(ServiceError::invalid_input(format!(
            "{} must not contain NUL characters",
            what
        )));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::invalid_input(format!(
            "{} must be at most {} characters",
            what, MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: JsonValue) -> Map<String, JsonValue> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_patch_applies_known_fields() {
        let update = campaign_update_from_patch(&patch(json!({
            "name": "  Summer Single ",
            "status": "active",
            "campaign_data": {"budget": 500, "platforms": ["spotify"]}
        })))
        .unwrap();

        assert_eq!(update.name.as_deref(), Some("Summer Single"));
        assert_eq!(update.status, Some(CampaignStatus::Active));
        assert_eq!(
            update.campaign_data,
            Some(Some(json!({"budget": 500, "platforms": ["spotify"]})))
        );
    }

    #[test]
    fn test_patch_ignores_unknown_fields() {
        let update = campaign_update_from_patch(&patch(json!({
            "id": 999,
            "user_id": 42,
            "created_at": "2020-01-01T00:00:00Z",
            "progress": 75
        })))
        .unwrap();

        assert!(update.is_empty());
    }

    #[test]
    fn test_patch_null_campaign_data_clears() {
        let update = campaign_update_from_patch(&patch(json!({"campaign_data": null}))).unwrap();
        assert_eq!(update.campaign_data, Some(None));
    }

    #[test]
    fn test_patch_rejects_bad_values() {
        for bad in [
            json!({"status": "archived"}),
            json!({"status": 3}),
            json!({"name": ""}),
            json!({"name": null}),
            json!({"name": "x".repeat(MAX_NAME_LEN + 1)}),
        ] {
            let result = campaign_update_from_patch(&patch(bad.clone()));
            assert!(
                matches!(result, Err(ServiceError::InvalidInput(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_nul_is_rejected_before_storage() {
        assert!(matches!(
            required_name("bad\u{0}name", "Campaign name"),
            Err(ServiceError::InvalidInput(_))
        ));
        for bad in [
            json!({"name": "bad\u{0}name"}),
            json!({"campaign_data": {"notes": "bad\u{0}"}}),
        ] {
            assert!(matches!(
                campaign_update_from_patch(&patch(bad)),
                Err(ServiceError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_required_name_trims() {
        assert_eq!(required_name("  Tour ", "Campaign name").unwrap(), "Tour");

        let err = required_name("   ", "Task name").unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: Task name is required");
    }

    #[test]
    fn test_mutable_fields_are_the_patch_keys() {
        for field in MUTABLE_FIELDS {
            let value = match field {
                "campaign_data" => json!({}),
                "status" => json!("paused"),
                _ => json!("New name"),
            };
            let mut fields = Map::new();
            fields.insert(field.to_string(), value);
            assert!(!campaign_update_from_patch(&fields).unwrap().is_empty());
        }
    }
}
