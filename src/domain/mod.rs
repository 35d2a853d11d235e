//! Domain layer - Core types and collaborator seams

pub mod api_key;
pub mod error;
pub mod session;

pub use api_key::{
    validate_candidate_key, ApiKeyValidationError, IssuedApiKey, KeyService, KeyVerification,
    NewApiKey, PlaintextKey, VerificationCode,
};
pub use error::DomainError;
pub use session::{Session, SessionVerifier, UserId};
