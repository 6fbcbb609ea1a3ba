//! HTTP transport used by the fetcher

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::Client as ReqwestClient;
use tracing::debug;

use super::config::FetchConfig;
use super::error::{AttemptError, FetchError};

/// Raw result of a single GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// Performs a single GET request for the fetcher's retry loop
pub trait PageClient: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<PageResponse, AttemptError>> + Send;
}

/// [`PageClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpPageClient {
    client: ReqwestClient,
}

impl HttpPageClient {
    /// Build a client with browser-like headers, a timeout and a redirect limit
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value(&config.accept)?);
        headers.insert(ACCEPT_LANGUAGE, header_value(&config.accept_language)?);

        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

fn header_value(value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value).map_err(|_| FetchError::InvalidHeader {
        value: value.to_string(),
    })
}

impl PageClient for HttpPageClient {
    async fn get(&self, url: &str) -> Result<PageResponse, AttemptError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(PageResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_sends_browser_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/posting")
            .match_header("user-agent", mockito::Matcher::Regex("Mozilla/5.0".to_string()))
            .match_header("accept-language", mockito::Matcher::Regex("en-US".to_string()))
            .with_status(200)
            .with_body("<html><body>ok</body></html>")
            .expect(1)
            .create_async()
            .await;

        let client = HttpPageClient::new(&FetchConfig::default()).unwrap();
        let response = client
            .get(&format!("{}/posting", server.url()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "<html><body>ok</body></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_reports_non_success_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/gone")
            .with_status(404)
            .with_body("not found")
            .create_async()
            .await;

        let client = HttpPageClient::new(&FetchConfig::default()).unwrap();
        let response = client.get(&format!("{}/gone", server.url())).await.unwrap();

        assert_eq!(response.status, 404);
    }
}
