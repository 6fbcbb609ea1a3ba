//! # Extraction Pipeline Module
//!
//! Turns a job posting URL or pasted posting text into validated
//! [`ExtractedJobData`]. Each invocation is a single sequential chain:
//!
//! ```text
//! URL  -> fetch -> reduce -> prompt -> invoke -> parse -> validate
//! text ----------> truncate -> prompt -> invoke -> parse -> validate
//! ```
//!
//! Invocations run concurrently and share only the [`ModelRateLimiter`].
//!
//! ## Key Components
//!
//! - `Extractor`: the pipeline, generic over the text generator, HTTP client
//!   and sleeper so every stage can be exercised without network access
//! - `PipelineStage`: the stage an invocation is in; stages only move forward

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::fetcher::{Fetcher, HttpPageClient, PageClient, Sleeper, TokioSleeper};
use crate::job::ExtractedJobData;
use crate::model::{ModelRateLimiter, TextGenerator};
use crate::parser;
use crate::prompt::{self, PromptSource};
use crate::reducer::{extract_metadata, reduce, truncate_to_char_boundary};
use crate::validator::{completeness_gate, validate};

/// Stages of a single extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    Idle,
    Fetching,
    Reducing,
    Prompting,
    Invoking,
    Parsing,
    Validating,
    Succeeded,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Fetching => "fetching",
            PipelineStage::Reducing => "reducing",
            PipelineStage::Prompting => "prompting",
            PipelineStage::Invoking => "invoking",
            PipelineStage::Parsing => "parsing",
            PipelineStage::Validating => "validating",
            PipelineStage::Succeeded => "succeeded",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Succeeded | PipelineStage::Failed)
    }
}

/// Logs every stage transition of one invocation
#[derive(Debug)]
struct StageTracker {
    stage: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Idle,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(next > self.stage, "stage moved from {} to {}", self.stage, next);
        debug!(from = %self.stage, to = %next, "Pipeline stage transition");
        self.stage = next;
    }

    fn finish<T>(&mut self, result: &Result<T>) {
        match result {
            Ok(_) => {
                self.advance(PipelineStage::Succeeded);
                info!("Extraction succeeded");
            }
            Err(e) => {
                error!(stage = %self.stage, "Extraction failed: {}", e);
                self.stage = PipelineStage::Failed;
            }
        }
    }
}

/// Extracts structured job data from URLs or pasted text
pub struct Extractor<G, C = HttpPageClient, S = TokioSleeper> {
    config: ExtractorConfig,
    fetcher: Fetcher<C, S>,
    generator: G,
    limiter: Arc<ModelRateLimiter>,
}

impl<G: TextGenerator> Extractor<G> {
    /// Create an extractor that fetches pages over HTTP
    pub fn new(
        config: ExtractorConfig,
        generator: G,
        limiter: Arc<ModelRateLimiter>,
    ) -> Result<Self> {
        let fetcher = Fetcher::new(&config.fetch, config.retry)?;
        Ok(Self::with_fetcher(config, fetcher, generator, limiter))
    }
}

impl<G, C, S> Extractor<G, C, S>
where
    G: TextGenerator,
    C: PageClient,
    S: Sleeper,
{
    pub fn with_fetcher(
        config: ExtractorConfig,
        fetcher: Fetcher<C, S>,
        generator: G,
        limiter: Arc<ModelRateLimiter>,
    ) -> Self {
        Self {
            config,
            fetcher,
            generator,
            limiter,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract job data from the posting at `url`
    #[instrument(skip(self))]
    pub async fn extract_from_url(&self, url: &str, user_id: &str) -> Result<ExtractedJobData> {
        let mut tracker = StageTracker::new();
        let result = self.run_url(url, user_id, &mut tracker).await;
        tracker.finish(&result);
        result
    }

    /// Extract job data from text the user pasted
    ///
    /// Text with no more than `min_text_length` characters (after trimming)
    /// is rejected before any network or model call.
    #[instrument(skip(self, raw_text), fields(chars = raw_text.chars().count()))]
    pub async fn extract_from_text(
        &self,
        raw_text: &str,
        user_id: &str,
    ) -> Result<ExtractedJobData> {
        let mut tracker = StageTracker::new();
        let result = self.run_text(raw_text, user_id, &mut tracker).await;
        tracker.finish(&result);
        result
    }

    async fn run_url(
        &self,
        url: &str,
        user_id: &str,
        tracker: &mut StageTracker,
    ) -> Result<ExtractedJobData> {
        tracker.advance(PipelineStage::Fetching);
        let html = self.fetcher.acquire(url).await?;

        tracker.advance(PipelineStage::Reducing);
        let metadata = extract_metadata(&html);
        if metadata.is_empty() {
            debug!("Page carries no title, description or site name");
        }
        let content = reduce(&html, self.config.max_content_length);
        debug!(
            html_bytes = html.len(),
            content_bytes = content.len(),
            "Reduced page content"
        );

        tracker.advance(PipelineStage::Prompting);
        let prompt = prompt::build(
            &content,
            &PromptSource::Url {
                url,
                metadata: &metadata,
            },
        );

        self.complete(&prompt, user_id, tracker).await
    }

    async fn run_text(
        &self,
        raw_text: &str,
        user_id: &str,
        tracker: &mut StageTracker,
    ) -> Result<ExtractedJobData> {
        let text = raw_text.trim();
        let length = text.chars().count();
        if length <= self.config.min_text_length {
            return Err(ExtractError::InputTooShort {
                length,
                minimum: self.config.min_text_length,
            });
        }

        tracker.advance(PipelineStage::Reducing);
        let content = truncate_to_char_boundary(text, self.config.max_content_length);

        tracker.advance(PipelineStage::Prompting);
        let prompt = prompt::build(content, &PromptSource::PastedText);

        self.complete(&prompt, user_id, tracker).await
    }

    async fn complete(
        &self,
        prompt: &str,
        user_id: &str,
        tracker: &mut StageTracker,
    ) -> Result<ExtractedJobData> {
        tracker.advance(PipelineStage::Invoking);
        self.limiter.acquire().await?;
        let response = self.generator.generate(user_id, prompt).await?;
        debug!(response_bytes = response.len(), "Model responded");

        tracker.advance(PipelineStage::Parsing);
        let parsed = parser::parse(&response);
        if let Some(strategy) = parsed.strategy() {
            debug!(%strategy, "Recovered JSON from model response");
        }
        let value = parsed.into_value()?;

        tracker.advance(PipelineStage::Validating);
        let data = validate(value)?;
        completeness_gate(&data)?;
        Ok(data)
    }
}
