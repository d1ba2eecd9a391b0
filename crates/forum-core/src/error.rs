//! Error taxonomy for the forum pipeline

use crate::model::StageKind;
use thiserror::Error;

/// Result type alias for forum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by every stage and collaborator
#[derive(Error, Debug)]
pub enum Error {
    /// Raw text is empty or carries nothing that can be interpreted
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// No usable market data could be obtained for the query
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// A derivation stage received a dataset with no usable points
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Report composition was called without one or more required fields
    #[error("Incomplete input: missing {}", missing.join(", "))]
    IncompleteInput { missing: Vec<String> },

    /// A single provider call exceeded its time allowance
    #[error("Provider call '{operation}' timed out after {timeout_ms} ms")]
    ProviderTimeout { operation: String, timeout_ms: u64 },

    /// A provider call failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// A stage failed while deriving its output
    #[error("{stage} stage failed: {reason}")]
    Derivation { stage: StageKind, reason: String },

    /// Input did not have the expected structure
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persistence collaborator failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stable snake_case tag used in structured failure responses
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedQuery(_) => "malformed_query",
            Self::DataUnavailable(_) => "data_unavailable",
            Self::InsufficientData(_) => "insufficient_data",
            Self::IncompleteInput { .. } => "incomplete_input",
            Self::ProviderTimeout { .. } => "provider_timeout",
            Self::Provider(_) => "provider",
            Self::Derivation { .. } => "derivation",
            Self::InvalidInput(_) => "invalid_input",
            Self::Storage(_) => "storage",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
        }
    }

    /// Whether this error aborts a request instead of being absorbed as a partial failure
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::InsufficientData(_)
                | Self::ProviderTimeout { .. }
                | Self::Provider(_)
                | Self::Derivation { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::IncompleteInput {
            missing: vec!["query_data".to_string(), "insights".to_string()],
        };
        assert_eq!(err.to_string(), "Incomplete input: missing query_data, insights");

        let err = Error::Derivation {
            stage: StageKind::Media,
            reason: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "media stage failed: boom");
    }

    #[test]
    fn test_terminal_classification() {
        assert!(Error::MalformedQuery(String::new()).is_terminal());
        assert!(Error::DataUnavailable(String::new()).is_terminal());
        assert!(Error::IncompleteInput { missing: vec![] }.is_terminal());
        assert!(!Error::InsufficientData(String::new()).is_terminal());
        assert!(
            !Error::ProviderTimeout {
                operation: "get_news".to_string(),
                timeout_ms: 10
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Error::MalformedQuery(String::new()).kind(), "malformed_query");
        assert_eq!(Error::DataUnavailable(String::new()).kind(), "data_unavailable");
        assert_eq!(Error::IncompleteInput { missing: vec![] }.kind(), "incomplete_input");
    }
}
