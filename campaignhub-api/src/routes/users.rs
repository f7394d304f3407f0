/// User endpoints
///
/// ```text
/// POST /api/users                 {email, artist_name?}  -> 201 {user, message}
/// GET  /api/users                                        -> 200 {users, count}
/// GET  /api/users/:id                                    -> 200 {user}
/// GET  /api/users/:id/campaigns                          -> 200 {campaigns, count}
/// GET  /api/users/health                                 -> 200 {status, service}
/// ```

use super::{parse_body, ServiceHealth};
use crate::{
    app::AppState,
    error::ApiResult,
    extractors::{JsonBody, PathParams},
};
use axum::{extract::State, http::StatusCode, Json};
use campaignhub_shared::models::{Campaign, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Format is checked after normalization by the service
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: String,

    #[validate(length(max = 255, message = "Artist name must be at most 255 characters"))]
    #[serde(default)]
    pub artist_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct UserCampaignsResponse {
    pub campaigns: Vec<Campaign>,
    pub count: usize,
}

/// Creates a user
///
/// # Errors
///
/// - 400 if the body is missing, `email` is absent or malformed
/// - 409 if the email is already registered
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let req: CreateUserRequest = parse_body(body, &["email"])?;
    req.validate()?;

    let user = state
        .services
        .users
        .create_user(&req.email, req.artist_name.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user,
            message: Some("User created successfully"),
        }),
    ))
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<UserListResponse>> {
    let users = state.services.users.get_all_users().await?;

    Ok(Json(UserListResponse {
        count: users.len(),
        users,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.services.users.get_user_by_id(id).await?;

    Ok(Json(UserResponse {
        user,
        message: None,
    }))
}

pub async fn get_user_campaigns(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> ApiResult<Json<UserCampaignsResponse>> {
    let campaigns = state.services.users.get_user_campaigns(id).await?;

    Ok(Json(UserCampaignsResponse {
        count: campaigns.len(),
        campaigns,
    }))
}

pub async fn health() -> Json<ServiceHealth> {
    Json(ServiceHealth::healthy("users"))
}
