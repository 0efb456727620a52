//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;

use crate::telemetry::TracingConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    /// Force JSON log output on or off; the environment decides when unset
    #[serde(default)]
    pub log_json: Option<bool>,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Chat store settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Prefix of generated group chat names ("Group" gives "Group 1", "Group 2", ...)
    #[serde(default = "default_group_name_prefix")]
    pub group_name_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            group_name_prefix: default_group_name_prefix(),
        }
    }
}

impl StoreConfig {
    /// Name of the `n`-th group chat
    #[must_use]
    pub fn group_name(&self, n: u64) -> String {
        format!("{} {}", self.group_name_prefix, n)
    }
}

// Default value functions
fn default_app_name() -> String {
    "chat-store".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_group_name_prefix() -> String {
    "Group".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unusable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_json = match lookup("LOG_JSON") {
            Some(raw) => Some(parse_bool(&raw).ok_or(ConfigError::InvalidValue("LOG_JSON", raw))?),
            None => None,
        };

        let group_name_prefix = match lookup("GROUP_NAME_PREFIX") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::InvalidValue("GROUP_NAME_PREFIX", raw));
            }
            Some(raw) => raw.trim().to_string(),
            None => default_group_name_prefix(),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
                log_json,
            },
            store: StoreConfig { group_name_prefix },
        })
    }

    /// Tracing setup matching the configured environment
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        let config = match self.app.env {
            Environment::Production => TracingConfig::production(),
            Environment::Development => TracingConfig::development(),
            Environment::Staging => TracingConfig::default(),
        };
        match self.app.log_json {
            Some(json) => config.with_json(json),
            None => config,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
