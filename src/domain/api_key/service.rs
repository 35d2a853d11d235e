//! Key management seam

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{IssuedApiKey, KeyVerification, NewApiKey};
use crate::domain::DomainError;

/// Hosted key service: system of record for key issuance and verification
///
/// Implementations never retry; failures surface as `DomainError::Upstream`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Mint one key bound to the request's external id
    async fn create_key(&self, request: NewApiKey) -> Result<IssuedApiKey, DomainError>;

    /// Ask the service whether a candidate key is valid
    async fn verify_key(&self, key: &str) -> Result<KeyVerification, DomainError>;

    /// Cheap reachability probe used by readiness checks
    async fn health_check(&self) -> Result<(), DomainError>;

    fn service_name(&self) -> &'static str;
}
