//! Stateless input checks shared by the services and the route layer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Column width of `users.email` and `waitlist.email`
pub const MAX_EMAIL_LEN: usize = 255;

/// Column width of every name column (`artist_name`, `name`, `task_name`)
pub const MAX_NAME_LEN: usize = 255;

/// Column width of `campaign_tasks.description`
pub const MAX_DESCRIPTION_LEN: usize = 1000;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The record is not a JSON object
    #[error("No data provided")]
    NotAnObject,

    /// One or more required fields are absent or empty
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Text contains a NUL character, which Postgres text columns can't store
    #[error("Text must not contain NUL characters")]
    ContainsNul,
}

/// Checks an email against a conservative `local@domain.tld` pattern.
///
/// The local part allows ASCII letters, digits and `._%+-`; the domain needs
/// at least one dot and a TLD of two or more letters. Callers normalize first:
/// surrounding whitespace is not accepted here.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trims and lower-cases an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Fails when any of `fields` is absent, `null`, or an empty string in `record`.
///
/// All missing fields are reported together, in the order they were asked for.
pub fn validate_required_fields(record: &JsonValue, fields: &[&str]) -> Result<(), ValidationError> {
    let object = record.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<String> = fields
        .iter()
        .filter(|field| match object.get(**field) {
            None | Some(JsonValue::Null) => true,
            Some(JsonValue::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        })
        .map(|field| field.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

/// Checks a normalized email against the column width
pub fn email_fits(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN
}

/// Trims an optional free-text value, collapsing blank input to `None`
///
/// Fails on text containing NUL.
pub fn trim_optional(value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) if text.contains('\0') => Err(ValidationError::ContainsNul),
        Some(text) => Ok(Some(text.to_string())),
        None => Ok(None),
    }
}

/// Whether any string or object key inside `value` contains NUL
///
/// JSONB rejects `\u0000`, so such documents can't be stored.
pub fn json_contains_nul(value: &JsonValue) -> bool {
    match value {
        JsonValue::String(s) => s.contains('\0'),
        JsonValue::Array(items) => items.iter().any(json_contains_nul),
        JsonValue::Object(fields) => fields
            .iter()
            .any(|(key, value)| key.contains('\0') || json_contains_nul(value)),
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::Number(_) => false,
    }
}
