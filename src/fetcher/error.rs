//! Error types for the fetcher module

use thiserror::Error;

/// Why a single fetch attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The server answered with something other than 200 OK
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body does not look like an HTML document
    #[error("response is not an HTML document")]
    NotHtml,

    /// Connection, TLS, redirect or body decoding failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl AttemptError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AttemptError::Timeout)
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AttemptError::Timeout
        } else {
            AttemptError::Transport(err.to_string())
        }
    }
}

/// Error type for page acquisition
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL was rejected before any request was made
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A configured header value is not valid HTTP
    #[error("Invalid header value '{value}'")]
    InvalidHeader { value: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Every attempt failed and the last one timed out
    #[error("Timeout fetching {url}: no response after {attempts} attempts")]
    Timeout { url: String, attempts: u32 },

    /// Every attempt failed for a reason other than a timeout
    #[error("Failed to fetch {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: AttemptError,
    },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}
