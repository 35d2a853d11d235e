//! Session entity and the caller identity it carries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const MAX_USER_ID_LENGTH: usize = 255;

/// Identifier of a signed-in user, as issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(DomainError::unauthenticated("Session subject is empty"));
        }

        if id.len() > MAX_USER_ID_LENGTH {
            return Err(DomainError::unauthenticated(format!(
                "Session subject exceeds {} characters",
                MAX_USER_ID_LENGTH
            )));
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A verified session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    session_id: Option<String>,
    expires_at: DateTime<Utc>,
    leeway: Duration,
}

impl Session {
    pub fn new(user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            session_id: None,
            expires_at,
            leeway: Duration::zero(),
        }
    }

    /// Clock skew tolerated past `expires_at`
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at + self.leeway
    }
}
