//! Configuration management for TodoBot
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, TodobotError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for TodoBot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Presentation settings for the chat session
    #[serde(default)]
    pub ui: UiConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the `/api/...` paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional request timeout (seconds)
    ///
    /// Unset means the transport default applies.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

impl BackendConfig {
    /// Request timeout as a `Duration`, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Chat session presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Sender name shown on assistant messages
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// How long a notification stays visible (seconds)
    #[serde(default = "default_notification_seconds")]
    pub notification_seconds: u64,
}

fn default_assistant_name() -> String {
    "TodoBot".to_string()
}

fn default_notification_seconds() -> u64 {
    3
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            notification_seconds: default_notification_seconds(),
        }
    }
}

impl UiConfig {
    /// Notification display duration
    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_seconds)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(TodobotError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(TodobotError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("TODOBOT_BASE_URL") {
            self.backend.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("TODOBOT_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.backend.timeout_seconds = Some(value);
            } else {
                tracing::warn!("Invalid TODOBOT_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(name) = std::env::var("TODOBOT_ASSISTANT_NAME") {
            self.ui.assistant_name = name;
        }

        if let Ok(seconds) = std::env::var("TODOBOT_NOTIFICATION_SECONDS") {
            if let Ok(value) = seconds.parse() {
                self.ui.notification_seconds = value;
            } else {
                tracing::warn!("Invalid TODOBOT_NOTIFICATION_SECONDS: {}", seconds);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            tracing::debug!("Using base URL override from CLI: {}", base_url);
            self.backend.base_url = base_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.backend.base_url).map_err(|e| {
            TodobotError::Config(format!(
                "Invalid backend.base_url '{}': {}",
                self.backend.base_url, e
            ))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(TodobotError::Config(format!(
                "backend.base_url must use http or https, got: {}",
                base.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == Some(0) {
            return Err(TodobotError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.ui.assistant_name.trim().is_empty() {
            return Err(
                TodobotError::Config("ui.assistant_name cannot be empty".to_string()).into(),
            );
        }

        if self.ui.notification_seconds == 0 {
            return Err(TodobotError::Config(
                "ui.notification_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
