/// Service error taxonomy
///
/// Every service method returns `ServiceResult<T>`. The API layer maps each
/// variant to one HTTP status:
///
/// | Variant        | Status |
/// |----------------|--------|
/// | `InvalidInput` | 400    |
/// | `NotFound`     | 404    |
/// | `Conflict`     | 409    |
/// | `Internal`     | 500    |
///
/// Storage-level integrity violations are translated by the services
/// themselves (see [`is_unique_violation`] and [`is_foreign_key_violation`]),
/// so a raw `sqlx::Error` only ever reaches this type as `Internal`.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result alias used throughout the service layer
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed or missing input, detected before any write
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uniqueness violation (duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Anything unexpected, including storage failures
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("Resource not found".to_string()),
            other => ServiceError::Internal(format!("Database error: {}", other)),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

/// Returns true if the error is a unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Returns true if the error is a foreign-key violation
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ServiceError::invalid_input("Invalid email format");
        assert_eq!(err.to_string(), "Invalid input: Invalid email format");

        let err = ServiceError::not_found("User");
        assert_eq!(err.to_string(), "Not found: User not found");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_other_sqlx_errors_are_internal() {
        let err: ServiceError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn test_validation_error_maps_to_invalid_input() {
        let err: ServiceError =
            ValidationError::MissingFields(vec!["name".to_string()]).into();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
