//! # Model Invocation Module
//!
//! The text-generation capability the pipeline consumes, plus everything
//! needed to call it responsibly.
//!
//! ## Key Components
//!
//! - `TextGenerator`: `generate(user_id, prompt)` returning text or a classified error
//! - `GeminiGenerator`: Gemini `generateContent` over reqwest, authenticated with the user's own key
//! - `CredentialStore`: looks up a user's API key
//! - `ModelRateLimiter`: token bucket shared by every extraction
//! - `MockGenerator`: canned replies for tests and demos

use std::collections::HashMap;
use std::future::Future;

use thiserror::Error;

pub mod gemini;
pub mod limiter;
pub mod mock;

pub use gemini::GeminiGenerator;
pub use limiter::{LimiterClosed, ModelRateLimiter};
pub use mock::MockGenerator;

/// Default Gemini model used for extraction
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Classified failure of a generation call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The user has no API key configured
    #[error("no API key configured for user '{user_id}'")]
    CredentialMissing { user_id: String },

    /// The provider refused the content
    #[error("content blocked by the model provider{}", reason_suffix(.reason))]
    ContentBlocked { reason: Option<String> },

    /// Network, quota or provider failure
    #[error("model call failed: {0}")]
    Transport(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(": {}", reason))
        .unwrap_or_default()
}

/// Per-user text generation
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        user_id: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerateError>> + Send;
}

/// Looks up the API key a user configured for the model provider
pub trait CredentialStore: Send + Sync {
    fn api_key(&self, user_id: &str) -> Option<String>;
}

/// In-memory credentials keyed by user id
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    keys: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.keys.insert(user_id.into(), api_key.into());
        self
    }
}

impl CredentialStore for StaticCredentials {
    fn api_key(&self, user_id: &str) -> Option<String> {
        self.keys.get(user_id).cloned()
    }
}

/// A single key from `GEMINI_API_KEY`, shared by every user
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    key: Option<String>,
}

impl EnvCredentials {
    pub const VAR: &'static str = "GEMINI_API_KEY";

    pub fn from_env() -> Self {
        Self {
            key: std::env::var(Self::VAR).ok(),
        }
    }
}

impl CredentialStore for EnvCredentials {
    fn api_key(&self, _user_id: &str) -> Option<String> {
        self.key.clone()
    }
}
