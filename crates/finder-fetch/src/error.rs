//! Fetch error types.

use thiserror::Error;

/// Errors that can occur while fetching a page from upstream.
///
/// None of these escape a search session; they are turned into an empty
/// page plus a reported message at the fetcher boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (connect, DNS, TLS, body read)
    #[error("Request failed: {0}")]
    Http(String),

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Upstream answered 429
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Request did not complete within the client timeout
    #[error("Timeout waiting for response")]
    Timeout,

    /// Body was not valid JSON
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client could not be built from the given settings
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(_) | FetchError::Timeout | FetchError::RateLimited => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Parse(_) | FetchError::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::RateLimited.is_transient());
        assert!(FetchError::Http("reset".into()).is_transient());
        assert!(FetchError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!FetchError::Status {
            status: 404,
            body: String::new()
        }
        .is_transient());
        assert!(!FetchError::Parse("eof".into()).is_transient());
    }
}
