use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to TheMealDB or setting up the client.
///
/// Query methods on [`crate::MealDbClient`] never return these; request
/// failures are retried and then collapsed into a fallback value. They
/// surface from configuration, construction and the favorites store.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused, DNS failure, body read failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The attempt did not complete within the request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Server answered with a non-success status
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// Response body did not match the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Base URL or endpoint could not be turned into a request URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Favorites store could not be read or written
    #[error("Store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether the retry loop should spend another attempt on this error.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_)
                | ApiError::Timeout(_)
                | ApiError::HttpStatus(_)
                | ApiError::Decode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ApiError::HttpStatus(503).to_string(),
            "HTTP error! status: 503"
        );
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(10)).to_string(),
            "Request timed out after 10s"
        );
    }

    #[test]
    fn test_request_failure_classification() {
        assert!(ApiError::HttpStatus(500).is_request_failure());
        assert!(ApiError::Timeout(Duration::from_secs(1)).is_request_failure());
        assert!(!ApiError::InvalidUrl("nope".to_string()).is_request_failure());
        assert!(!ApiError::Store("disk full".to_string()).is_request_failure());
    }
}
