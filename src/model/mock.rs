//! # Mock Text Generator for Testing
//!
//! Provides a `MockGenerator` that implements [`TextGenerator`] without any
//! network access. The reply (or error) can be changed after creation, and
//! every prompt it receives is recorded.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use super::{GenerateError, TextGenerator};

/// A mock generator returning a predefined reply or error
#[derive(Debug, Clone)]
pub struct MockGenerator {
    response: Arc<Mutex<Result<String, GenerateError>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockGenerator {
    /// Creates a mock that replies with an empty string
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(String::new()))),
            prompts: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a mock that always replies with `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            response: Arc::new(Mutex::new(Ok(text.into()))),
            ..Self::new()
        }
    }

    pub async fn set_text_response(&self, text: &str) {
        *self.response.lock().await = Ok(text.to_string());
    }

    pub async fn set_error(&self, error: GenerateError) {
        *self.response.lock().await = Err(error);
    }

    /// Number of `generate` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().await.last().cloned()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TextGenerator for MockGenerator {
    async fn generate(&self, _user_id: &str, prompt: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_string());
        self.response.lock().await.clone()
    }
}
