/// Waitlist endpoints
///
/// ```text
/// POST /api/waitlist/join    {email}  -> 201 new signup / 200 already joined
/// GET  /api/waitlist/stats            -> 200 {total_signups, status}
/// GET  /api/waitlist                  -> 200 {waitlist, total}
/// GET  /api/waitlist/health           -> 200 {status, service}
/// ```

use super::{parse_body, ServiceHealth};
use crate::{app::AppState, error::ApiResult, extractors::JsonBody};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campaignhub_shared::models::WaitlistEntry;
use campaignhub_shared::services::{JoinOutcome, WaitlistStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct JoinWaitlistRequest {
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: String,
}

/// Body of a join; `success` and `position` are present only for new signups
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub message: &'static str,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    pub joined_at: DateTime<Utc>,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        match outcome {
            JoinOutcome::Joined { entry, position } => JoinResponse {
                success: Some(true),
                message: "Successfully joined the waitlist!",
                email: entry.email,
                position: Some(position),
                joined_at: entry.joined_at,
            },
            JoinOutcome::AlreadyJoined { entry } => JoinResponse {
                success: None,
                message: "You're already on the waitlist!",
                email: entry.email,
                position: None,
                joined_at: entry.joined_at,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    pub waitlist: Vec<WaitlistEntry>,
    pub total: usize,
}

/// Adds an email to the waitlist
///
/// Joining twice is not an error: the second call answers 200 with the
/// first `joined_at`.
pub async fn join_waitlist(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Response> {
    let req: JoinWaitlistRequest = parse_body(body, &["email"])?;
    req.validate()?;

    let outcome = state.services.waitlist.join_waitlist(&req.email).await?;
    let status = if outcome.is_new() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(JoinResponse::from(outcome))).into_response())
}

pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<WaitlistStats>> {
    Ok(Json(state.services.waitlist.get_waitlist_stats().await?))
}

/// All entries, most recent first
pub async fn list_entries(State(state): State<AppState>) -> ApiResult<Json<WaitlistResponse>> {
    let waitlist = state.services.waitlist.get_all_waitlist_entries().await?;

    Ok(Json(WaitlistResponse {
        total: waitlist.len(),
        waitlist,
    }))
}

pub async fn health() -> Json<ServiceHealth> {
    Json(ServiceHealth::healthy("waitlist"))
}
