//! API Key domain
//!
//! Keys are issued and verified by a hosted key service. This module holds
//! the request/response shapes exchanged with that service and the checks
//! applied to a candidate key before it is sent anywhere.

mod entity;
mod service;
mod validation;

pub use entity::{IssuedApiKey, KeyVerification, NewApiKey, PlaintextKey, VerificationCode};
pub use service::KeyService;
pub use validation::{validate_candidate_key, ApiKeyValidationError, MAX_CANDIDATE_KEY_LENGTH};

#[cfg(test)]
pub use service::MockKeyService;
