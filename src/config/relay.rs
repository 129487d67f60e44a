//! Relay configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::adapters::http::HEALTHCHECK_PATH;

/// Relay transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Path of the WebSocket upgrade route
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Directory of prerendered pages and static assets served for all
    /// other HTTP paths
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl RelayConfig {
    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.ws_path.starts_with('/') {
            return Err(ValidationError::InvalidWsPath);
        }
        if self.ws_path == HEALTHCHECK_PATH {
            return Err(ValidationError::ReservedWsPath(HEALTHCHECK_PATH));
        }
        if self.static_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyStaticDir);
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ws_path: default_ws_path(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("build")
}
