//! # Page Fetcher Module
//!
//! Downloads the raw HTML of a job posting. Career sites are slow, flaky and
//! sometimes serve bot walls, so every fetch runs through a [`RetryPolicy`]
//! with exponential backoff before giving up.
//!
//! ## Key Components
//!
//! - `Fetcher`: validates the URL and drives the retry loop
//! - `PageClient`: a single GET request (`HttpPageClient` in production)
//! - `RetryPolicy` / `Sleeper`: backoff schedule and how the wait happens
//!
//! An attempt only succeeds on HTTP 200 with a body that contains an `<html`
//! marker; the body is returned untouched.

mod client;
mod config;
mod error;
mod retry;

pub use client::{HttpPageClient, PageClient, PageResponse};
pub use config::{FetchConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_REDIRECTS};
pub use error::{AttemptError, FetchError};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

#[cfg(test)]
pub(crate) use retry::testing;

use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Fetches job posting HTML with retry and backoff
#[derive(Debug, Clone)]
pub struct Fetcher<C = HttpPageClient, S = TokioSleeper> {
    client: C,
    policy: RetryPolicy,
    sleeper: S,
}

impl Fetcher {
    /// Create a fetcher that talks HTTP and sleeps on the tokio timer
    pub fn new(config: &FetchConfig, policy: RetryPolicy) -> Result<Self, FetchError> {
        Ok(Self::with_parts(
            HttpPageClient::new(config)?,
            policy,
            TokioSleeper,
        ))
    }
}

impl<C, S> Fetcher<C, S>
where
    C: PageClient,
    S: Sleeper,
{
    pub fn with_parts(client: C, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Download the HTML at `url`
    ///
    /// Invalid URLs fail immediately. Any other failure is retried according
    /// to the policy, backing off after every failed attempt.
    #[instrument(skip(self), fields(max_attempts = self.policy.max_attempts))]
    pub async fn acquire(&self, url: &str) -> Result<String, FetchError> {
        validate_url(url)?;

        let mut last_error = AttemptError::Transport("no attempt made".to_string());
        for attempt in 1..=self.policy.max_attempts {
            debug!(attempt, "Fetching {}", url);

            match self.attempt(url).await {
                Ok(html) => {
                    info!(attempt, bytes = html.len(), "Fetched {}", url);
                    return Ok(html);
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(attempt, ?delay, "Fetch attempt failed: {}", e);
                    last_error = e;
                    self.sleeper.sleep(delay).await;
                }
            }
        }

        let attempts = self.policy.max_attempts;
        error!(attempts, "Giving up on {}: {}", url, last_error);
        if last_error.is_timeout() {
            Err(FetchError::Timeout {
                url: url.to_string(),
                attempts,
            })
        } else {
            Err(FetchError::Exhausted {
                url: url.to_string(),
                attempts,
                last_error,
            })
        }
    }

    async fn attempt(&self, url: &str) -> Result<String, AttemptError> {
        let response = self.client.get(url).await?;
        if response.status != 200 {
            return Err(AttemptError::Status(response.status));
        }
        if !contains_html_marker(&response.body) {
            return Err(AttemptError::NotHtml);
        }
        Ok(response.body)
    }
}

fn validate_url(url: &str) -> Result<(), FetchError> {
    if !url.starts_with("http") {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: "only http(s) URLs are supported".to_string(),
        });
    }
    Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

fn contains_html_marker(body: &str) -> bool {
    body.as_bytes()
        .windows(5)
        .any(|window| window.eq_ignore_ascii_case(b"<html"))
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSleeper;
    use super::*;
    use mockito::Server;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Replays a fixed list of outcomes, repeating the last one
    #[derive(Clone)]
    struct ScriptedClient {
        outcomes: Arc<Mutex<Vec<Result<PageResponse, AttemptError>>>>,
        calls: Arc<AtomicU32>,
    }

    impl ScriptedClient {
        fn new(outcomes: Vec<Result<PageResponse, AttemptError>>) -> Self {
            Self {
                outcomes: Arc::new(Mutex::new(outcomes)),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PageClient for ScriptedClient {
        async fn get(&self, _url: &str) -> Result<PageResponse, AttemptError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.len() > 1 {
                outcomes.remove(0)
            } else {
                outcomes[0].clone()
            }
        }
    }

    fn ok_page(body: &str) -> Result<PageResponse, AttemptError> {
        Ok(PageResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(100))
    }

    #[tokio::test]
    async fn test_returns_html_body_unchanged() {
        let body = "<!DOCTYPE html>\n<HTML lang=\"en\"><body><h1>Rust Engineer</h1></body></HTML>";
        let client = ScriptedClient::new(vec![ok_page(body)]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::with_parts(client.clone(), fast_policy(3), sleeper.clone());

        let html = fetcher.acquire("https://jobs.example.com/1").await.unwrap();

        assert_eq!(html, body);
        assert_eq!(client.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_http_url_without_request() {
        let client = ScriptedClient::new(vec![ok_page("<html></html>")]);
        let fetcher =
            Fetcher::with_parts(client.clone(), fast_policy(3), RecordingSleeper::default());

        let err = fetcher.acquire("ftp://jobs.example.com").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let client = ScriptedClient::new(vec![
            Err(AttemptError::Timeout),
            Ok(PageResponse {
                status: 503,
                body: "busy".to_string(),
            }),
            ok_page("<html><body>posting</body></html>"),
        ]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::with_parts(client.clone(), fast_policy(3), sleeper.clone());

        let html = fetcher.acquire("https://jobs.example.com/2").await.unwrap();

        assert!(html.contains("posting"));
        assert_eq!(client.calls(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn test_body_without_html_marker_is_retried() {
        let client = ScriptedClient::new(vec![ok_page("{\"captcha\": true}")]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::with_parts(client.clone(), fast_policy(2), sleeper.clone());

        let err = fetcher.acquire("https://jobs.example.com/3").await.unwrap_err();

        match err {
            FetchError::Exhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(attempts, 2);
                assert_eq!(last_error, AttemptError::NotHtml);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeouts_exhaust_with_full_backoff() {
        let client = ScriptedClient::new(vec![Err(AttemptError::Timeout)]);
        let sleeper = RecordingSleeper::default();
        let fetcher = Fetcher::with_parts(
            client.clone(),
            RetryPolicy::new(3, Duration::from_secs(1)),
            sleeper.clone(),
        );

        let err = fetcher.acquire("https://jobs.example.com/4").await.unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().to_lowercase().contains("timeout"));
        assert!(err.to_string().contains("3 attempts"));
        assert_eq!(client.calls(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[tokio::test]
    async fn test_fetches_over_http() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/jobs/42")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><main>Platform Engineer</main></body></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = Fetcher::new(&FetchConfig::default(), fast_policy(3)).unwrap();
        let html = fetcher
            .acquire(&format!("{}/jobs/42", server.url()))
            .await
            .unwrap();

        assert!(html.contains("Platform Engineer"));
        mock.assert_async().await;
    }

    #[test]
    fn test_html_marker_is_case_insensitive() {
        assert!(contains_html_marker("<!doctype html><HtMl>"));
        assert!(!contains_html_marker("plain text"));
        assert!(!contains_html_marker(""));
    }
}
