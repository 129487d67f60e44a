//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid log filter directive: {0}")]
    InvalidLogFilter(String),

    #[error("WebSocket path must start with '/'")]
    InvalidWsPath,

    #[error("WebSocket path collides with reserved route {0}")]
    ReservedWsPath(&'static str),

    #[error("Static directory must not be empty")]
    EmptyStaticDir,
}
