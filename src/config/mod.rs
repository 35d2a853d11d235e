mod app_config;

pub use app_config::{
    AppConfig, KeyServiceConfig, KeyServiceSettings, LogFormat, LoggingConfig, ServerConfig,
    SessionConfig,
};
