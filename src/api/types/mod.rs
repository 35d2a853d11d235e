//! HTTP wire types

pub mod error;
pub mod json;
pub mod keys;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use keys::{CreateKeyResponse, VerifyKeyRequest, VerifyKeyResponse};
