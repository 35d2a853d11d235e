use std::time::Duration;

use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::observability::ObservabilityConfig;

/// Environment variable holding the key service root credential
pub const ROOT_KEY_ENV: &str = "UNKEY_ROOT_KEY";

/// Environment variable holding the key collection identifier
pub const API_ID_ENV: &str = "UNKEY_API_ID";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub key_service: KeyServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Session token verification settings
///
/// At least one of `secret`, `public_key_pem` or `jwks_json` must be set.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Shared HS256 secret
    pub secret: Option<String>,
    /// RS256 public key in PEM form
    pub public_key_pem: Option<String>,
    /// Inline JWKS document
    pub jwks_json: Option<String>,
    /// Expected `iss` claim
    pub issuer: Option<String>,
    /// Allowed `azp` claim values; empty allows any
    pub authorized_parties: Vec<String>,
    /// Cookie carrying the session token
    pub cookie_name: String,
    /// Clock skew tolerance for `exp` / `nbf`
    pub leeway_secs: u64,
}

/// Hosted key service settings as loaded from configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct KeyServiceConfig {
    pub root_key: String,
    pub api_id: String,
    pub base_url: String,
    pub prefix: String,
    /// Per-request timeout; unset leaves the transport default
    pub timeout_secs: Option<u64>,
}

/// Key service settings after startup validation
#[derive(Clone)]
pub struct KeyServiceSettings {
    pub root_key: String,
    pub api_id: String,
    pub base_url: String,
    pub prefix: String,
    pub timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: None,
            public_key_pem: None,
            jwks_json: None,
            issuer: None,
            authorized_parties: Vec::new(),
            cookie_name: "__session".to_string(),
            leeway_secs: 5,
        }
    }
}

impl Default for KeyServiceConfig {
    fn default() -> Self {
        Self {
            root_key: String::new(),
            api_id: String::new(),
            base_url: "https://api.unkey.dev".to_string(),
            prefix: "rhr_scouting".to_string(),
            timeout_secs: None,
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[hidden]"))
            .field("public_key_pem", &self.public_key_pem.is_some())
            .field("jwks_json", &self.jwks_json.is_some())
            .field("issuer", &self.issuer)
            .field("authorized_parties", &self.authorized_parties)
            .field("cookie_name", &self.cookie_name)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl std::fmt::Debug for KeyServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyServiceConfig")
            .field("root_key", &"[hidden]")
            .field("api_id", &self.api_id)
            .field("base_url", &self.base_url)
            .field("prefix", &self.prefix)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SessionConfig {
    pub fn has_key_material(&self) -> bool {
        [&self.secret, &self.public_key_pem, &self.jwks_json]
            .iter()
            .any(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

impl KeyServiceConfig {
    /// Check the required service parameters and produce usable settings
    pub fn validate(&self) -> Result<KeyServiceSettings, DomainError> {
        let root_key = require(&self.root_key, ROOT_KEY_ENV)?;
        let api_id = require(&self.api_id, API_ID_ENV)?;

        if self.prefix.trim().is_empty() {
            return Err(DomainError::configuration("key_service.prefix cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(DomainError::configuration(format!(
                "key_service.base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        Ok(KeyServiceSettings {
            root_key,
            api_id,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            prefix: self.prefix.trim().to_string(),
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

fn require(value: &str, env_name: &str) -> Result<String, DomainError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(DomainError::configuration(format!(
            "{} environment variable is required",
            env_name
        )));
    }

    Ok(value.to_string())
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("key_service.root_key", std::env::var(ROOT_KEY_ENV).ok())?
            .set_override_option("key_service.api_id", std::env::var(API_ID_ENV).ok())?
            .build()?;

        config.try_deserialize()
    }
}
