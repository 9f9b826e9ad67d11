use validator::Validate;

use crate::api::errors::ApiError;

pub(crate) fn validate_payload(payload: &impl Validate) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))
}

pub(crate) fn validate_pagination(skip: i64, limit: i64) -> Result<(), ApiError> {
    if skip < 0 {
        return Err(ApiError::BadRequest("skip must be non-negative".to_string()));
    }
    if !(1..=1000).contains(&limit) {
        return Err(ApiError::BadRequest("limit must be in range 1..1000".to_string()));
    }
    Ok(())
}

/// Rejects blank path or query identifiers before they reach the database.
pub(crate) fn require_id<'a>(value: &'a str, what: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.len() > 36 {
        return Err(ApiError::BadRequest(format!("Invalid {what}")));
    }
    Ok(trimmed)
}
