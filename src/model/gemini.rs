//! Gemini `generateContent` over reqwest

use std::time::Duration;

use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, error, info_span, instrument, Instrument};

use super::{CredentialStore, GenerateError, TextGenerator, DEFAULT_MODEL};
use crate::prompt::EXTRACTION_PREAMBLE;

pub mod types;

use types::{
    ApiErrorResponse, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

/// Public Gemini Developer API endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_VERSION: &str = "v1beta";

/// Default timeout for a generation request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// [`TextGenerator`] calling Gemini with the requesting user's API key
#[derive(Debug, Clone)]
pub struct GeminiGenerator<S> {
    client: ReqwestClient,
    base_url: String,
    credentials: S,
    model: String,
    temperature: f64,
}

impl<S: CredentialStore> GeminiGenerator<S> {
    pub fn new(credentials: S, model: impl Into<String>) -> Self {
        let client = ReqwestClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            model: model.into(),
            temperature: 0.1,
        }
    }

    pub fn with_default_model(credentials: S) -> Self {
        Self::new(credentials, DEFAULT_MODEL)
    }

    /// Send requests to another host, such as a proxy
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, API_VERSION, self.model
        )
    }

    fn request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: Some(Content::system(EXTRACTION_PREAMBLE)),
            generation_config: Some(GenerationConfig {
                temperature: Some(self.temperature),
            }),
        }
    }

    async fn send(&self, api_key: &str, prompt: &str) -> Result<String, GenerateError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!("API error: {} - {}", status, body);
            return Err(api_failure(status, &body));
        }

        let response: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse response: {}", e);
            GenerateError::Transport(format!("Failed to parse response: {}", e))
        })?;
        into_text(response)
    }
}

impl<S: CredentialStore> TextGenerator for GeminiGenerator<S> {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_bytes = prompt.len()))]
    async fn generate(&self, user_id: &str, prompt: &str) -> Result<String, GenerateError> {
        let api_key = self
            .credentials
            .api_key(user_id)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerateError::CredentialMissing {
                user_id: user_id.to_string(),
            })?;

        self.send(&api_key, prompt)
            .instrument(info_span!("completion"))
            .await
    }
}

/// Text of the first candidate, or the reason Gemini withheld it
fn into_text(response: GenerateContentResponse) -> Result<String, GenerateError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(GenerateError::ContentBlocked {
            reason: Some(reason),
        });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerateError::Transport("response contained no candidates".to_string()))?;

    if let Some(reason) = candidate.block_reason() {
        return Err(GenerateError::ContentBlocked {
            reason: Some(reason.to_string()),
        });
    }

    let text = candidate.text();
    debug!(
        bytes = text.len(),
        finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
        "Received completion"
    );
    Ok(text)
}

fn api_failure(status: StatusCode, body: &str) -> GenerateError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|envelope| match envelope.error.status {
            Some(kind) => format!("{} ({}): {}", envelope.error.code, kind, envelope.error.message),
            None => format!("{}: {}", envelope.error.code, envelope.error.message),
        })
        .unwrap_or_else(|_| format!("{}: {}", status, body));
    GenerateError::Transport(message)
}
