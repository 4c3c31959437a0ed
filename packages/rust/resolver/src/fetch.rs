//! The external byte-retrieval capability for URL sources.
//!
//! The core never retries, proxies, or paces requests; it sees fetching as
//! a single bounded capability behind the [`Fetcher`] trait. Tests inject
//! scripted fetchers; production uses [`HttpFetcher`] (reqwest).

use std::time::Duration;

use async_trait::async_trait;
use linkmill_shared::{LinkmillError, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Maximum number of redirects to follow when fetching a source.
const MAX_REDIRECTS: usize = 5;

/// User-Agent string when no override is configured.
const DEFAULT_USER_AGENT: &str = concat!("linkmill/", env!("CARGO_PKG_VERSION"));

/// Retrieves the body of a URL as text, or fails with a fetch error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP implementation of [`Fetcher`] with a bounded per-request timeout.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given per-request timeout. `user_agent`
    /// overrides the default `linkmill/<version>` identity when set.
    pub fn new(timeout_secs: u64, user_agent: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LinkmillError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        // The classifier only checks the scheme prefix; reject URLs that
        // do not actually parse before handing them to the client.
        let parsed = Url::parse(url)
            .map_err(|e| LinkmillError::Fetch(format!("{url}: invalid URL: {e}")))?;

        debug!(url = %parsed, "fetching source");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| LinkmillError::Fetch(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkmillError::Fetch(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| LinkmillError::Fetch(format!("{url}: failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetches_body_on_success() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/list.txt"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("line1\nline2"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(10, None).unwrap();
        let body = fetcher.fetch(&format!("{}/list.txt", server.uri())).await.unwrap();
        assert_eq!(body, "line1\nline2");
    }

    #[tokio::test]
    async fn configured_user_agent_is_sent_on_requests() {
        let server = wiremock::MockServer::start().await;

        // The mock only matches requests carrying the override header.
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/ua"))
            .and(wiremock::matchers::header("user-agent", "acme-sync/2.0"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(10, Some("acme-sync/2.0")).unwrap();
        let body = fetcher.fetch(&format!("{}/ua", server.uri())).await.unwrap();
        assert_eq!(body, "ok");

        // The default identity does not match the override-only mock.
        let plain = HttpFetcher::new(10, None).unwrap();
        let err = plain.fetch(&format!("{}/ua", server.uri())).await.unwrap_err();
        assert!(matches!(err, LinkmillError::Fetch(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/gone"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(10, None).unwrap();
        let err = fetcher.fetch(&format!("{}/gone", server.uri())).await.unwrap_err();
        assert!(matches!(err, LinkmillError::Fetch(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn unparseable_url_is_fetch_error() {
        let fetcher = HttpFetcher::new(10, None).unwrap();
        let err = fetcher.fetch("https://").await.unwrap_err();
        assert!(matches!(err, LinkmillError::Fetch(_)));
    }
}
