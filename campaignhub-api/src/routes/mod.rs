/// API route handlers
///
/// Handlers are thin: parse and validate the request, call one service
/// method, shape the response. Errors flow out as `ApiError`.
///
/// - `health`: Service and database health
/// - `users`: Artist accounts
/// - `campaigns`: Campaigns and campaign tasks
/// - `waitlist`: Pre-launch waitlist

pub mod campaigns;
pub mod health;
pub mod users;
pub mod waitlist;

use crate::error::{ApiError, ApiResult};
use crate::extractors::NO_DATA_PROVIDED;
use campaignhub_shared::validation::validate_required_fields;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Turns a raw JSON body into a typed request
///
/// An empty or non-object body is `No data provided`; absent or blank
/// `required` fields are reported together before any type checking.
pub(crate) fn parse_body<T: DeserializeOwned>(body: Value, required: &[&str]) -> ApiResult<T> {
    if body.as_object().map_or(true, |fields| fields.is_empty()) {
        return Err(ApiError::BadRequest(NO_DATA_PROVIDED.to_string()));
    }

    validate_required_fields(&body, required)?;

    serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}

/// Body of the per-resource health endpoints
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    pub service: &'static str,
}

impl ServiceHealth {
    pub(crate) fn healthy(service: &'static str) -> Self {
        Self {
            status: "healthy",
            service,
        }
    }
}
