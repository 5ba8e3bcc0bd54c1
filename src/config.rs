//! Configuration System
//!
//! Client configuration with layered sources: built-in defaults, the user's global
//! config file, an optional explicit file, and `CTXSYNC_` environment variables.
//! Later sources override earlier ones.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the session service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Bearer credential; usually supplied through `CTXSYNC_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Poll cadence and deadlines
    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            sync: SyncSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Poll interval and deadlines for sync and clear waits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Default deadline for `Session::sync`
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,

    /// Default deadline for a waited clear
    #[serde(default = "default_clear_timeout_secs")]
    pub clear_timeout_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    1500
}

fn default_sync_timeout_secs() -> u64 {
    225
}

fn default_clear_timeout_secs() -> u64 {
    60
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            sync_timeout_secs: default_sync_timeout_secs(),
            clear_timeout_secs: default_clear_timeout_secs(),
        }
    }
}

impl SyncSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    pub fn clear_timeout(&self) -> Duration {
        Duration::from_secs(self.clear_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be positive".to_string());
        }
        if self.sync_timeout_secs == 0 {
            return Err("sync_timeout_secs must be positive".to_string());
        }
        if self.clear_timeout_secs == 0 {
            return Err("clear_timeout_secs must be positive".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    Endpoint(String),
    Timeout(String),
    Sync(String),
    Logging(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::Endpoint(msg) => write!(f, "Endpoint: {}", msg),
            ConfigValidationError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ConfigValidationError::Sync(msg) => write!(f, "Sync: {}", msg),
            ConfigValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

impl ClientConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            errors.push(ConfigValidationError::Endpoint(
                "endpoint cannot be empty".to_string(),
            ));
        } else if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            errors.push(ConfigValidationError::Endpoint(format!(
                "'{}' must start with http:// or https://",
                endpoint
            )));
        }

        if self.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::Timeout(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::Timeout(
                "connect_timeout_secs must be positive".to_string(),
            ));
        }

        if let Err(e) = self.sync.validate() {
            errors.push(ConfigValidationError::Sync(e));
        }

        if !matches!(self.logging.format.as_str(), "json" | "text") {
            errors.push(ConfigValidationError::Logging(format!(
                "unknown format '{}'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(ConfigValidationError::Logging(format!(
                "unknown output '{}'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
