//! Identity verification seam

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::Session;
use crate::domain::DomainError;

/// Verifies a session token presented by an inbound request
///
/// Returns `DomainError::Unauthenticated` for any token that does not
/// prove a live session.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Session, DomainError>;
}
