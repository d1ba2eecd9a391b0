//! Error types for provider clients

use thiserror::Error;

/// Transport-level failures of the concrete market data clients
#[derive(Debug, Error)]
pub enum ProviderError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Provider needs credentials that were not configured
    #[error("Missing API key for {provider}")]
    MissingApiKey { provider: String },

    /// No data for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },
}

/// Result type alias for provider client operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Provider failures are stage-local: they surface as `Provider` errors
impl From<ProviderError> for forum_core::Error {
    fn from(err: ProviderError) -> Self {
        forum_core::Error::Provider(err.to_string())
    }
}
