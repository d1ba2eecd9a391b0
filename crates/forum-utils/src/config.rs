//! Application-level configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::logging::LogFormat;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
    /// Where composed reports are written
    pub reports_dir: PathBuf,
    /// Where user profiles are written
    pub profiles_dir: PathBuf,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "market-forum".to_string(),
            environment: "development".to_string(),
            reports_dir: PathBuf::from("reports"),
            profiles_dir: PathBuf::from("user_data"),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load overrides from `FORUM_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(env) = lookup("FORUM_ENV") {
            config.environment = env;
        }
        if let Some(dir) = lookup("FORUM_REPORTS_DIR") {
            config.reports_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FORUM_PROFILES_DIR") {
            config.profiles_dir = PathBuf::from(dir);
        }
        if let Some(format) = lookup("FORUM_LOG_FORMAT") {
            config.log_format = format.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "FORUM_LOG_FORMAT".to_string(),
                reason,
            })?;
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}
