//! Session extractor for the key endpoints

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::Session;

/// Extractor that requires a signed-in caller
///
/// The session token is read from:
/// - Authorization header: `Bearer <token>`
/// - the session cookie (name from `AppState::session_cookie`)
///
/// Every failure maps to the same 403 so callers cannot probe why a token
/// was refused; the reason is logged at debug level.
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_session_token(&parts.headers, &state.session_cookie) else {
            debug!("No session token on request");
            return Err(ApiError::unauthenticated());
        };

        let session = state.session_verifier.verify(&token).await.map_err(|e| {
            debug!(error = %e, "Session token rejected");
            ApiError::unauthenticated()
        })?;

        if session.is_expired() {
            debug!(user_id = %session.user_id(), "Session expired");
            return Err(ApiError::unauthenticated());
        }

        Ok(RequireSession(session))
    }
}

/// Session token from the Bearer header, falling back to the session cookie
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_value(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        assert_eq!(
            extract_session_token(&headers, "__session").as_deref(),
            Some("eyJhbGciOiJIUzI1NiJ9.test")
        );
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer   token   ".parse().unwrap());

        assert_eq!(extract_session_token(&headers, "__session").as_deref(), Some("token"));
    }

    #[test]
    fn test_missing_token() {
        assert!(extract_session_token(&HeaderMap::new(), "__session").is_none());
    }

    #[test]
    fn test_invalid_auth_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        assert!(extract_session_token(&headers, "__session").is_none());
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; __session=cookie-token; other=1".parse().unwrap(),
        );

        assert_eq!(
            extract_session_token(&headers, "__session").as_deref(),
            Some("cookie-token")
        );
        assert!(extract_session_token(&headers, "session").is_none());
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer header-token".parse().unwrap());
        headers.insert(header::COOKIE, "__session=cookie-token".parse().unwrap());

        assert_eq!(
            extract_session_token(&headers, "__session").as_deref(),
            Some("header-token")
        );
    }

    #[test]
    fn test_empty_cookie_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "__session=".parse().unwrap());

        assert!(extract_session_token(&headers, "__session").is_none());
    }
}
