//! # jobextract CLI Application
//!
//! Command-line front end for the extraction pipeline.
//!
//! ## Key Components
//!
//! - `url`: fetch a job posting page and extract it
//! - `text`: extract a posting from a file, or from stdin with `-`
//!
//! The result is printed as pretty JSON on stdout; logs go to stderr and are
//! filtered with `RUST_LOG`. The Gemini API key is read from `GEMINI_API_KEY`.

mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use jobextract::model::{EnvCredentials, GeminiGenerator, ModelRateLimiter};
use jobextract::{ExtractedJobData, Extractor, ExtractorConfig};
use tokio::io::AsyncReadExt;
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Extract structured data from job postings with an LLM", long_about = None)]
struct Cli {
    /// Gemini model to use (overrides JOBEXTRACT_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a job posting page and extract it
    Url(UrlArgs),

    /// Extract a job posting from pasted text
    Text(TextArgs),
}

#[derive(Args, Debug)]
struct UrlArgs {
    /// URL of the job posting
    #[arg(required = true)]
    url: String,

    /// User the model call is made for
    #[arg(short, long, default_value = "local")]
    user: String,
}

#[derive(Args, Debug)]
struct TextArgs {
    /// File containing the posting text, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// User the model call is made for
    #[arg(short, long, default_value = "local")]
    user: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber();

    let mut config = ExtractorConfig::from_env();
    if let Some(model) = cli.model {
        config.model = model;
    }

    let limiter = Arc::new(ModelRateLimiter::per_minute(config.requests_per_minute));
    let generator = GeminiGenerator::new(EnvCredentials::from_env(), config.model.clone());
    let extractor = Extractor::new(config, generator, limiter.clone())?;

    let result = match cli.command {
        Commands::Url(args) => url_command(&extractor, args).await,
        Commands::Text(args) => text_command(&extractor, args).await,
    };
    limiter.shutdown();

    let job = result?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

#[instrument(skip(extractor))]
async fn url_command(
    extractor: &Extractor<GeminiGenerator<EnvCredentials>>,
    args: UrlArgs,
) -> anyhow::Result<ExtractedJobData> {
    Ok(extractor.extract_from_url(&args.url, &args.user).await?)
}

#[instrument(skip(extractor))]
async fn text_command(
    extractor: &Extractor<GeminiGenerator<EnvCredentials>>,
    args: TextArgs,
) -> anyhow::Result<ExtractedJobData> {
    let text = if args.input.as_os_str() == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read posting text from stdin")?;
        buffer
    } else {
        tokio::fs::read_to_string(&args.input)
            .await
            .with_context(|| format!("Failed to read {}", args.input.display()))?
    };

    Ok(extractor.extract_from_text(&text, &args.user).await?)
}
