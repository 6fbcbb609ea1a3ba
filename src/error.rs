//! Error types for the jobextract crate

use thiserror::Error;

use crate::fetcher::FetchError;
use crate::model::{GenerateError, LimiterClosed};
use crate::parser::ParseError;
use crate::pipeline::PipelineStage;
use crate::validator::{ExtractionIncomplete, ValidationError};

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Error type for extraction operations
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The job posting page could not be downloaded
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The user has no model API key configured
    #[error("no API key configured for user '{user_id}'. Add your Gemini API key and try again")]
    CredentialMissing { user_id: String },

    /// The model provider refused the content
    #[error("the model provider blocked this content{}", reason_suffix(.reason))]
    ContentBlocked { reason: Option<String> },

    /// The model call failed for another reason
    #[error("model error: {0}")]
    Model(String),

    /// The model reply did not contain a JSON object
    #[error("could not read the model response: {0}")]
    Parse(#[from] ParseError),

    /// The model reply had the wrong shape
    #[error("invalid extraction: {0}")]
    Validation(#[from] ValidationError),

    /// Required fields are still missing at the end of the pipeline
    #[error(transparent)]
    ExtractionIncomplete(#[from] ExtractionIncomplete),

    /// Pasted text is too short to be a job posting
    #[error("pasted text has {length} characters but more than {minimum} are required. Paste the complete job posting")]
    InputTooShort { length: usize, minimum: usize },

    /// The shared model rate limiter was shut down
    #[error("the extractor is shutting down")]
    LimiterClosed,
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(" ({})", reason))
        .unwrap_or_default()
}

impl From<GenerateError> for ExtractError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::CredentialMissing { user_id } => Self::CredentialMissing { user_id },
            GenerateError::ContentBlocked { reason } => Self::ContentBlocked { reason },
            GenerateError::Transport(message) => Self::Model(message),
        }
    }
}

impl From<LimiterClosed> for ExtractError {
    fn from(_: LimiterClosed) -> Self {
        Self::LimiterClosed
    }
}

impl ExtractError {
    /// The pipeline stage that produced this error
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Fetch(_) => PipelineStage::Fetching,
            Self::InputTooShort { .. } => PipelineStage::Idle,
            Self::CredentialMissing { .. }
            | Self::ContentBlocked { .. }
            | Self::Model(_)
            | Self::LimiterClosed => PipelineStage::Invoking,
            Self::Parse(_) => PipelineStage::Parsing,
            Self::Validation(_) | Self::ExtractionIncomplete(_) => PipelineStage::Validating,
        }
    }
}
