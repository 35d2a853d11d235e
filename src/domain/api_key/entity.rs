//! API key request/response types

use serde::{Deserialize, Serialize};

use crate::domain::session::UserId;

/// Request to mint a new key for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApiKey {
    pub external_id: UserId,
    pub prefix: String,
    pub enabled: bool,
}

impl NewApiKey {
    /// A key bound to `owner`, enabled from the start
    pub fn for_owner(owner: UserId, prefix: impl Into<String>) -> Self {
        Self {
            external_id: owner,
            prefix: prefix.into(),
            enabled: true,
        }
    }
}

/// Plaintext secret of a freshly minted key
///
/// Only ever handed out once, in the create response. `Debug` never shows
/// the secret so the value cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PlaintextKey(String);

impl PlaintextKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for PlaintextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PlaintextKey([hidden])")
    }
}

/// A key as returned by the key service right after creation
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    pub key_id: String,
    pub key: PlaintextKey,
}

/// Outcome codes reported by the key service for a verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VerificationCode {
    Valid,
    NotFound,
    Forbidden,
    UsageExceeded,
    RateLimited,
    Unauthorized,
    Disabled,
    InsufficientPermissions,
    Expired,
    Other(String),
}

impl VerificationCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Valid => "VALID",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::UsageExceeded => "USAGE_EXCEEDED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Disabled => "DISABLED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::Expired => "EXPIRED",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for VerificationCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "VALID" => Self::Valid,
            "NOT_FOUND" => Self::NotFound,
            "FORBIDDEN" => Self::Forbidden,
            "USAGE_EXCEEDED" => Self::UsageExceeded,
            "RATE_LIMITED" => Self::RateLimited,
            "UNAUTHORIZED" => Self::Unauthorized,
            "DISABLED" => Self::Disabled,
            "INSUFFICIENT_PERMISSIONS" => Self::InsufficientPermissions,
            "EXPIRED" => Self::Expired,
            _ => Self::Other(code),
        }
    }
}

impl From<VerificationCode> for String {
    fn from(code: VerificationCode) -> Self {
        code.as_str().to_string()
    }
}

impl std::fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of asking the key service about a candidate key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyVerification {
    pub valid: bool,
    pub code: VerificationCode,
    pub key_id: Option<String>,
    pub external_id: Option<String>,
}

impl KeyVerification {
    pub fn valid(key_id: impl Into<String>) -> Self {
        Self {
            valid: true,
            code: VerificationCode::Valid,
            key_id: Some(key_id.into()),
            external_id: None,
        }
    }

    pub fn invalid(code: VerificationCode) -> Self {
        Self {
            valid: false,
            code,
            key_id: None,
            external_id: None,
        }
    }
}
