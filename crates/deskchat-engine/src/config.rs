//! Configuration types for the deskchat client.
//!
//! The config file is JSON. Missing fields fall back to defaults, so an
//! empty object is a valid config.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".deskchat/config.json";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL (origin) of the helpdesk server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Path of the chat endpoint.
    #[serde(default = "default_chat_path")]
    pub chat_path: String,

    /// Path of the conversation reset endpoint.
    #[serde(default = "default_reset_path")]
    pub reset_path: String,

    /// Raw `name=value` session cookie, sent only to `server_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,

    /// Request timeout. `None` waits as long as the network stack does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Whether the chat panel starts hidden.
    #[serde(default)]
    pub start_hidden: bool,
}

fn default_server_url() -> String {
    "http://localhost:5000".into()
}

fn default_chat_path() -> String {
    "/chat".into()
}

fn default_reset_path() -> String {
    "/chat/reset".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            chat_path: default_chat_path(),
            reset_path: default_reset_path(),
            session_cookie: None,
            timeout_seconds: None,
            start_hidden: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load configuration from a file, or defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Parse `server_url`, rejecting anything that is not http(s).
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.server_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.server_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidUrl(format!(
                "{}: unsupported scheme {other}",
                self.server_url
            ))),
        }
    }

    /// Check that the config is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        for path in [&self.chat_path, &self.reset_path] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath(path.clone()));
            }
        }
        Ok(())
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Server URL is malformed or not http(s).
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Endpoint path does not start with '/'.
    #[error("Invalid endpoint path: {0}")]
    InvalidPath(String),
}
