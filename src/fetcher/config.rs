//! # Fetcher Configuration Module
//!
//! HTTP settings used when downloading job postings. The defaults mimic a
//! desktop browser closely enough that most career sites serve their regular
//! HTML instead of a bot wall.

use std::time::Duration;

/// Default request timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of redirects followed before giving up
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9,de;q=0.8,fr;q=0.7";

/// Configuration for page fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// User agent to send with every request
    pub user_agent: String,

    /// Value of the `Accept` header
    pub accept: String,

    /// Value of the `Accept-Language` header
    pub accept_language: String,

    /// Timeout for a single attempt
    pub timeout: Duration,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DESKTOP_USER_AGENT.to_string(),
            accept: BROWSER_ACCEPT.to_string(),
            accept_language: BROWSER_ACCEPT_LANGUAGE.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}
