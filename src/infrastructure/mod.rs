//! Infrastructure layer - External service implementations

pub mod auth;
pub mod http_client;
pub mod key_service;
pub mod logging;
pub mod observability;
