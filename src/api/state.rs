//! Application state for shared services

use std::sync::Arc;

use crate::domain::{KeyService, SessionVerifier};

/// Read-only state shared by every request
///
/// Built once at startup from validated configuration; handlers never read
/// the environment themselves.
#[derive(Clone)]
pub struct AppState {
    pub session_verifier: Arc<dyn SessionVerifier>,
    pub key_service: Arc<dyn KeyService>,
    /// Prefix stamped on every minted key
    pub key_prefix: String,
    /// Cookie consulted when no Bearer header is present
    pub session_cookie: String,
}

impl AppState {
    pub fn new(
        session_verifier: Arc<dyn SessionVerifier>,
        key_service: Arc<dyn KeyService>,
        key_prefix: impl Into<String>,
        session_cookie: impl Into<String>,
    ) -> Self {
        Self {
            session_verifier,
            key_service,
            key_prefix: key_prefix.into(),
            session_cookie: session_cookie.into(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("key_service", &self.key_service.service_name())
            .field("key_prefix", &self.key_prefix)
            .field("session_cookie", &self.session_cookie)
            .finish()
    }
}
