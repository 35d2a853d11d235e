//! Candidate key validation

use thiserror::Error;

use crate::domain::DomainError;

/// Longest candidate key accepted for verification
pub const MAX_CANDIDATE_KEY_LENGTH: usize = 512;

/// Errors that can occur while validating a candidate key
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Must provide API key")]
    Missing,

    #[error("API key exceeds maximum length of {0} characters")]
    TooLong(usize),
}

impl From<ApiKeyValidationError> for DomainError {
    fn from(err: ApiKeyValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate a candidate key taken from a verify request
///
/// Rules:
/// - Must be present
/// - Cannot be empty or whitespace only
/// - Maximum 512 characters
///
/// Returns the key with surrounding whitespace removed.
pub fn validate_candidate_key(key: Option<&str>) -> Result<&str, ApiKeyValidationError> {
    let key = key.map(str::trim).unwrap_or_default();

    if key.is_empty() {
        return Err(ApiKeyValidationError::Missing);
    }

    if key.chars().count() > MAX_CANDIDATE_KEY_LENGTH {
        return Err(ApiKeyValidationError::TooLong(MAX_CANDIDATE_KEY_LENGTH));
    }

    Ok(key)
}
