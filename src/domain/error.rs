use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid API key: {code}")]
    InvalidKey { code: String },

    #[error("Upstream error: {service} - {message}")]
    Upstream {
        service: String,
        code: Option<String>,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_key(code: impl Into<String>) -> Self {
        Self::InvalidKey { code: code.into() }
    }

    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.into(),
            code: None,
            message: message.into(),
        }
    }

    pub fn upstream_with_code(
        service: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Upstream {
            service: service.into(),
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when the error came from the hosted key service or the wire to it
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}
