//! Configuration for the forum engine

use forum_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the media and insight stages are scheduled after fetching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Media and insight run side by side; insights cite the dataset only
    #[default]
    Concurrent,
    /// Media runs first so insights can cite its artifacts
    Sequential,
}

/// Configuration for forum engine operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumConfig {
    /// Overall time budget for one request
    pub request_timeout: Duration,

    /// Fraction of the budget reserved for fetching, above one half; derivation gets the rest
    pub fetch_share: f64,

    /// Hard cap for a single provider call
    pub provider_call_timeout: Duration,

    /// Lookback used when neither the query nor the profile names one
    pub default_lookback_days: u32,

    /// Maximum number of entities resolved from one query
    pub max_entities: usize,

    pub execution: ExecutionMode,

    /// TTL of the provider-side price cache
    pub price_cache_ttl: Duration,

    /// Finnhub API key (optional, enables live news)
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            fetch_share: 0.6,
            provider_call_timeout: Duration::from_secs(10),
            default_lookback_days: 30,
            max_entities: 5,
            execution: ExecutionMode::Concurrent,
            price_cache_ttl: Duration::from_secs(60),
            finnhub_api_key: None,
            finnhub_rate_limit: 60,
        }
    }
}

impl ForumConfig {
    /// Create a new configuration builder
    pub fn builder() -> ForumConfigBuilder {
        ForumConfigBuilder::default()
    }

    /// Load API keys from environment
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("FINNHUB_API_KEY") {
            self.finnhub_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if !(self.fetch_share > 0.5 && self.fetch_share < 1.0) {
            return Err(Error::Config(format!(
                "fetch_share must lie strictly between 0.5 and 1, got {}",
                self.fetch_share
            )));
        }

        if self.provider_call_timeout.is_zero() {
            return Err(Error::Config(
                "provider_call_timeout must be greater than 0".to_string(),
            ));
        }

        if self.default_lookback_days == 0 {
            return Err(Error::Config(
                "default_lookback_days must be greater than 0".to_string(),
            ));
        }

        if self.max_entities == 0 {
            return Err(Error::Config(
                "max_entities must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Share of the request budget given to fetching
    pub fn fetch_budget(&self) -> Duration {
        self.request_timeout.mul_f64(self.fetch_share)
    }

    /// Share of the request budget left to the media and insight stages
    pub fn derive_budget(&self) -> Duration {
        self.request_timeout.saturating_sub(self.fetch_budget())
    }
}

/// Builder for ForumConfig
#[derive(Debug, Default)]
pub struct ForumConfigBuilder {
    request_timeout: Option<Duration>,
    fetch_share: Option<f64>,
    provider_call_timeout: Option<Duration>,
    default_lookback_days: Option<u32>,
    max_entities: Option<usize>,
    execution: Option<ExecutionMode>,
    price_cache_ttl: Option<Duration>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
}

impl ForumConfigBuilder {
    /// Set the overall request budget
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the fraction of the budget given to fetching
    pub fn fetch_share(mut self, share: f64) -> Self {
        self.fetch_share = Some(share);
        self
    }

    /// Set the per-call provider timeout
    pub fn provider_call_timeout(mut self, duration: Duration) -> Self {
        self.provider_call_timeout = Some(duration);
        self
    }

    pub fn default_lookback_days(mut self, days: u32) -> Self {
        self.default_lookback_days = Some(days);
        self
    }

    pub fn max_entities(mut self, max: usize) -> Self {
        self.max_entities = Some(max);
        self
    }

    pub fn execution(mut self, mode: ExecutionMode) -> Self {
        self.execution = Some(mode);
        self
    }

    pub fn price_cache_ttl(mut self, duration: Duration) -> Self {
        self.price_cache_ttl = Some(duration);
        self
    }

    /// Set Finnhub API key
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Load API keys from environment
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("FINNHUB_API_KEY") {
            self.finnhub_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ForumConfig> {
        let defaults = ForumConfig::default();

        let config = ForumConfig {
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            fetch_share: self.fetch_share.unwrap_or(defaults.fetch_share),
            provider_call_timeout: self
                .provider_call_timeout
                .unwrap_or(defaults.provider_call_timeout),
            default_lookback_days: self
                .default_lookback_days
                .unwrap_or(defaults.default_lookback_days),
            max_entities: self.max_entities.unwrap_or(defaults.max_entities),
            execution: self.execution.unwrap_or(defaults.execution),
            price_cache_ttl: self.price_cache_ttl.unwrap_or(defaults.price_cache_ttl),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}
