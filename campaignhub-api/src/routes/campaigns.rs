/// Campaign endpoints
///
/// ```text
/// POST  /api/campaigns                               {user_id, name, status?}  -> 201 {campaign, message}
/// GET   /api/campaigns/:id                                                     -> 200 {campaign}
/// PATCH /api/campaigns/:id/progress                  {name?, status?, campaign_data?} -> 200 {campaign, message}
/// POST  /api/campaigns/:id/tasks                     {task_name, description?} -> 201 {task, message}
/// GET   /api/campaigns/:id/tasks                                               -> 200 {tasks, count}
/// POST  /api/campaigns/:id/tasks/:task_id/complete                             -> 200 {task, message}
/// ```

use super::parse_body;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extractors::{JsonBody, PathParams, NO_DATA_PROVIDED},
};
use axum::{extract::State, http::StatusCode, Json};
use campaignhub_shared::models::{Campaign, CampaignTask};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Create campaign request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    pub user_id: i64,

    #[validate(length(max = 255, message = "Campaign name must be at most 255 characters"))]
    pub name: String,

    /// One of draft, active, paused, completed; defaults to draft
    #[serde(default)]
    pub status: Option<String>,
}

/// Add task request
#[derive(Debug, Deserialize, Validate)]
pub struct AddTaskRequest {
    #[validate(length(max = 255, message = "Task name must be at most 255 characters"))]
    pub task_name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub campaign: Campaign,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: CampaignTask,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<CampaignTask>,
    pub count: usize,
}

/// Creates a campaign
///
/// # Errors
///
/// - 400 if `user_id` or `name` is missing, the status is unknown, or the
///   user does not exist
pub async fn create_campaign(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<(StatusCode, Json<CampaignResponse>)> {
    let req: CreateCampaignRequest = parse_body(body, &["user_id", "name"])?;
    req.validate()?;

    let campaign = state
        .services
        .campaigns
        .create_campaign(req.user_id, &req.name, req.status.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CampaignResponse {
            campaign,
            message: Some("Campaign created successfully"),
        }),
    ))
}

pub async fn get_campaign(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<Json<CampaignResponse>> {
    let campaign = state.services.campaigns.get_campaign(id).await?;

    Ok(Json(CampaignResponse {
        campaign,
        message: None,
    }))
}

/// Applies a partial update
///
/// Only `name`, `status` and `campaign_data` are applied; other keys are
/// ignored.
pub async fn update_campaign_progress(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Json<CampaignResponse>> {
    if body.as_object().map_or(true, |fields| fields.is_empty()) {
        return Err(ApiError::BadRequest(NO_DATA_PROVIDED.to_string()));
    }

    let campaign = state
        .services
        .campaigns
        .update_campaign_progress(id, &body)
        .await?;

    Ok(Json(CampaignResponse {
        campaign,
        message: Some("Campaign updated successfully"),
    }))
}

pub async fn add_task(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let req: AddTaskRequest = parse_body(body, &["task_name"])?;
    req.validate()?;

    let task = state
        .services
        .campaigns
        .add_task(id, &req.task_name, req.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            task,
            message: "Task created successfully",
        }),
    ))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<Json<TaskListResponse>> {
    let tasks = state.services.campaigns.list_tasks(id).await?;

    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks,
    }))
}

pub async fn complete_task(
    State(state): State<AppState>,
    PathParams((campaign_id, task_id)): PathParams<(i64, i64)>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .services
        .campaigns
        .complete_task(campaign_id, task_id)
        .await?;

    Ok(Json(TaskResponse {
        task,
        message: "Task completed",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_campaign_request_defaults() {
        let req: CreateCampaignRequest =
            serde_json::from_value(json!({"user_id": 7, "name": "Tour"})).unwrap();
        assert_eq!(req.user_id, 7);
        assert!(req.status.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_campaign_request_rejects_string_id() {
        let result = parse_body::<CreateCampaignRequest>(
            json!({"user_id": "seven", "name": "Tour"}),
            &["user_id", "name"],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_task_request_validation() {
        let req: AddTaskRequest = serde_json::from_value(json!({
            "task_name": "Pitch",
            "description": "d".repeat(1001)
        }))
        .unwrap();
        assert!(req.validate().unwrap_err().field_errors().contains_key("description"));
    }
}
