//! # jobextract - Structured Data from Job Postings
//!
//! This crate turns a job posting, given as a URL or as pasted text, into a
//! validated [`ExtractedJobData`] record using a large language model.
//!
//! ## Features
//!
//! - Robust page fetching with browser headers and exponential backoff
//! - HTML reduction that strips page chrome and keeps the posting body
//!   within a byte budget
//! - A single extraction prompt with a strict JSON output contract
//! - Tiered JSON recovery from free-form model replies
//! - Validation and repair of the model output
//! - A shared, shut-downable rate limiter for model calls
//! - Async API with Tokio, structured logging with `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use jobextract::model::{EnvCredentials, GeminiGenerator, ModelRateLimiter};
//! use jobextract::{Extractor, ExtractorConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractorConfig::from_env();
//!     let limiter = Arc::new(ModelRateLimiter::per_minute(config.requests_per_minute));
//!     let generator = GeminiGenerator::new(EnvCredentials::from_env(), config.model.clone());
//!     let extractor = Extractor::new(config, generator, limiter.clone())?;
//!
//!     let job = extractor
//!         .extract_from_url("https://careers.example.com/jobs/42", "local")
//!         .await?;
//!     println!("{} at {}", job.title(), job.company());
//!
//!     limiter.shutdown();
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod fetcher;
mod job;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod reducer;
pub mod validator;

pub use config::ExtractorConfig;
pub use error::{ExtractError, Result};
pub use job::{ExtractedJobData, KeyDetail};
pub use pipeline::{Extractor, PipelineStage};

/// Commonly used types
pub mod prelude {
    pub use crate::config::ExtractorConfig;
    pub use crate::error::{ExtractError, Result};
    pub use crate::job::{ExtractedJobData, KeyDetail};
    pub use crate::model::{ModelRateLimiter, TextGenerator};
    pub use crate::pipeline::{Extractor, PipelineStage};
}
