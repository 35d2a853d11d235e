//! API key desk
//!
//! Lets a signed-in user mint an API key and check a candidate key, with
//! all key storage and verification delegated to a hosted key service:
//! - Session verification of signed JWTs (HS256 secret, RS256 PEM or JWKS)
//! - Key issuance and verification through the hosted service's HTTP API
//! - A reveal-once client UI, in the browser and in the terminal

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{DomainError, KeyService};
use infrastructure::{
    auth::JwtSessionVerifier, http_client::HttpClient, key_service::UnkeyKeyService,
};
use tracing::info;

/// Create the application state from validated configuration
///
/// Missing key service credentials or session key material fail here, at
/// startup, never on an individual request.
pub fn create_app_state(config: &AppConfig) -> Result<AppState, DomainError> {
    let settings = config.key_service.validate()?;

    let client = HttpClient::from_timeout(settings.timeout)?;
    let key_service = UnkeyKeyService::with_base_url(
        client,
        settings.root_key,
        settings.api_id,
        settings.base_url.clone(),
    );

    let session_verifier = JwtSessionVerifier::from_config(&config.session)?;

    info!(
        key_service = key_service.service_name(),
        base_url = %settings.base_url,
        prefix = %settings.prefix,
        "Application state initialized"
    );

    Ok(AppState::new(
        Arc::new(session_verifier),
        Arc::new(key_service),
        settings.prefix,
        config.session.cookie_name.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.key_service.root_key = "unkey_root".to_string();
        config.key_service.api_id = "api_123".to_string();
        config.session.secret = Some("dev-secret".to_string());
        config
    }

    #[test]
    fn test_create_app_state() {
        let state = create_app_state(&configured()).unwrap();

        assert_eq!(state.key_prefix, "rhr_scouting");
        assert_eq!(state.session_cookie, "__session");
        assert_eq!(state.key_service.service_name(), "unkey");
    }

    #[test]
    fn test_missing_root_key_fails_startup() {
        let mut config = configured();
        config.key_service.root_key.clear();

        let err = create_app_state(&config).unwrap_err();
        assert!(err.to_string().contains("UNKEY_ROOT_KEY"));
    }

    #[test]
    fn test_missing_api_id_fails_startup() {
        let mut config = configured();
        config.key_service.api_id.clear();

        let err = create_app_state(&config).unwrap_err();
        assert!(err.to_string().contains("UNKEY_API_ID"));
    }

    #[test]
    fn test_missing_session_keys_fail_startup() {
        let mut config = configured();
        config.session.secret = None;

        assert!(matches!(
            create_app_state(&config),
            Err(DomainError::Configuration { .. })
        ));
    }
}
