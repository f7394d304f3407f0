/// Error handling for the API server
///
/// All handlers return `ApiResult<T>`; the error side renders as a status
/// code plus a `{"error": message}` body.
///
/// | Variant           | Status |
/// |-------------------|--------|
/// | `BadRequest`      | 400    |
/// | `ValidationError` | 400    |
/// | `NotFound`        | 404    |
/// | `Conflict`        | 409    |
/// | `RequestTimeout`  | 408    |
/// | `InternalError`   | 500    |
///
/// # Example
///
/// ```no_run
/// use campaignhub_api::error::ApiResult;
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler() -> ApiResult<Json<Value>> {
///     Ok(Json(json!({ "status": "healthy" })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use campaignhub_shared::validation::ValidationError as FieldsError;
use campaignhub_shared::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of every 500 response
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Body of a request cut off by the timeout layer
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Field-level validation failures (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Handler exceeded the configured request timeout (408)
    RequestTimeout,

    /// Internal server error (500); the detail is logged, never returned
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message clients see
    pub fn client_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Conflict(msg) => msg.clone(),
            ApiError::ValidationError(errors) => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            ApiError::RequestTimeout => TIMEOUT_MESSAGE.to_string(),
            ApiError::InternalError(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::RequestTimeout => f.write_str(TIMEOUT_MESSAGE),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
            }
            ApiError::Conflict(msg) => tracing::warn!("Conflict: {}", msg),
            ApiError::RequestTimeout => tracing::warn!("Request timed out"),
            _ => tracing::debug!("Request rejected: {}", self),
        }

        let body = Json(ErrorResponse {
            error: self.client_message(),
        });

        (self.status_code(), body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert required-field failures to API errors
impl From<FieldsError> for ApiError {
    fn from(err: FieldsError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Convert validator derive failures to API errors
///
/// Details are ordered by field name so the folded message is stable.
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(errors)
    }
}
