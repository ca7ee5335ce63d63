/// Structured error types for yieldwatch
///
/// Two failure classes reach the refresh boundary:
/// - transient upstream failures (network, HTTP status, timeout)
/// - malformed payloads (JSON or shape errors)
/// Both are handled identically there; the split only matters for logging.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum YieldWatchError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl YieldWatchError {
    /// True for failures that may succeed on the next tick without changes upstream
    pub fn is_transient(&self) -> bool {
        matches!(self, YieldWatchError::Network(_))
    }

    /// Short label for log lines and status output
    pub fn kind(&self) -> &'static str {
        match self {
            YieldWatchError::Network(_) => "network",
            YieldWatchError::Data(_) => "data",
            YieldWatchError::Configuration(_) => "configuration",
        }
    }
}

// =============================================================================
// NETWORK ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("Connection timeout to {endpoint} after {timeout_ms}ms")]
    ConnectionTimeout { endpoint: String, timeout_ms: u64 },

    #[error("HTTP {status} from {endpoint}")]
    HttpStatusError { endpoint: String, status: u16 },

    #[error("Request to {endpoint} failed: {message}")]
    RequestFailed { endpoint: String, message: String },
}

// =============================================================================
// DATA ERROR TYPES
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Unexpected payload shape: {0}")]
    UnexpectedShape(String),

    #[error("Invalid pool entry at index {index}: {message}")]
    InvalidRecord { index: usize, message: String },
}

pub type YieldWatchResult<T> = std::result::Result<T, YieldWatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let timeout: YieldWatchError = NetworkError::ConnectionTimeout {
            endpoint: "https://yields.llama.fi/pools".to_string(),
            timeout_ms: 10_000,
        }
        .into();
        assert!(timeout.is_transient());
        assert_eq!(timeout.kind(), "network");

        let shape: YieldWatchError = DataError::UnexpectedShape("object without data".into()).into();
        assert!(!shape.is_transient());
        assert_eq!(shape.kind(), "data");

        let config = YieldWatchError::Configuration("port must be non-zero".into());
        assert!(!config.is_transient());
        assert_eq!(config.kind(), "configuration");
        assert_eq!(
            config.to_string(),
            "Configuration error: port must be non-zero"
        );
    }

    #[test]
    fn test_display_messages() {
        let err: YieldWatchError = NetworkError::HttpStatusError {
            endpoint: "https://example.test/pools".to_string(),
            status: 503,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Network error: HTTP 503 from https://example.test/pools"
        );

        let err: YieldWatchError = DataError::InvalidRecord {
            index: 3,
            message: "invalid type".to_string(),
        }
        .into();
        assert!(err.to_string().contains("index 3"));
    }
}
