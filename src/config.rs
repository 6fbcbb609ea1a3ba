//! # Extractor Configuration Module
//!
//! Tunables for the extraction pipeline. Values come from [`Default`], the
//! builder, or `JOBEXTRACT_*` environment variables via
//! [`ExtractorConfig::from_env`].
//!
//! ## Key Components
//!
//! - `ExtractorConfig`: content budget, input floor, fetch and retry
//!   settings, model name and model request rate
//! - `ExtractorConfigBuilder`: builder for programmatic configuration

use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::fetcher::{FetchConfig, RetryPolicy};
use crate::model::DEFAULT_MODEL;
use crate::reducer::DEFAULT_MAX_CONTENT_LENGTH;

/// Pasted text must be longer than this many characters
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 50;

/// Default number of model calls allowed per minute across all extractions
pub const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(30) {
    Some(n) => n,
    None => unreachable!(),
};

const ENV_MAX_CONTENT_LENGTH: &str = "JOBEXTRACT_MAX_CONTENT_LENGTH";
const ENV_MIN_TEXT_LENGTH: &str = "JOBEXTRACT_MIN_TEXT_LENGTH";
const ENV_FETCH_TIMEOUT_SECS: &str = "JOBEXTRACT_FETCH_TIMEOUT_SECS";
const ENV_FETCH_ATTEMPTS: &str = "JOBEXTRACT_FETCH_ATTEMPTS";
const ENV_RETRY_BASE_MS: &str = "JOBEXTRACT_RETRY_BASE_MS";
const ENV_MODEL: &str = "JOBEXTRACT_MODEL";
const ENV_REQUESTS_PER_MINUTE: &str = "JOBEXTRACT_REQUESTS_PER_MINUTE";

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    /// Byte budget for reduced page content and pasted text
    pub max_content_length: usize,

    /// Pasted text must have more characters than this, after trimming
    pub min_text_length: usize,

    /// HTTP settings for page downloads
    pub fetch: FetchConfig,

    /// Retry schedule for page downloads
    pub retry: RetryPolicy,

    /// Gemini model name
    pub model: String,

    /// Model calls allowed per minute
    pub requests_per_minute: NonZeroU32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            fetch: FetchConfig::default(),
            retry: RetryPolicy::default(),
            model: DEFAULT_MODEL.to_string(),
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

impl ExtractorConfig {
    /// Create a new builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }

    /// Defaults overridden by `JOBEXTRACT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(n) = parse_var::<usize>(&lookup, ENV_MAX_CONTENT_LENGTH).filter(|n| *n > 0) {
            config.max_content_length = n;
        }
        if let Some(n) = parse_var::<usize>(&lookup, ENV_MIN_TEXT_LENGTH) {
            config.min_text_length = n;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_FETCH_TIMEOUT_SECS).filter(|s| *s > 0) {
            config.fetch.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, ENV_FETCH_ATTEMPTS) {
            config.retry = RetryPolicy::new(attempts, config.retry.base_delay);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_RETRY_BASE_MS) {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|m| !m.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(rpm) = parse_var::<NonZeroU32>(&lookup, ENV_REQUESTS_PER_MINUTE) {
            config.requests_per_minute = rpm;
        }

        debug!(?config, "Loaded extractor configuration");
        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring invalid configuration value");
            None
        }
    }
}

/// Builder for ExtractorConfig
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    pub fn max_content_length(mut self, max_content_length: usize) -> Self {
        self.config.max_content_length = max_content_length;
        self
    }

    pub fn min_text_length(mut self, min_text_length: usize) -> Self {
        self.config.min_text_length = min_text_length;
        self
    }

    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.config.fetch = fetch;
        self
    }

    /// Set the timeout for a single fetch attempt
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.fetch.user_agent = user_agent.into();
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn requests_per_minute(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.config.requests_per_minute = requests_per_minute;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}
