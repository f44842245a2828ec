//! Source URL templating and document fetching.
//!
//! Endpoints declare a source template such as
//! `https://en.wikipedia.org/wiki/%page%`. Per request, [`resolve_source`]
//! fills in the query parameters and [`Fetcher::fetch`] downloads the HTML
//! that the extraction engine then evaluates.

mod template;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use scrapeapi_shared::{FetchConfig, Result, ScrapeApiError};

pub use template::{placeholders, resolve_source};

/// User-Agent string for source requests.
const USER_AGENT: &str = concat!("scrapeapi/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Downloads source documents. Cheap to share: the inner client is pooled.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_response_bytes: u64,
}

impl Fetcher {
    /// Build a fetcher from the `[fetch]` config section.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);

        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScrapeApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Fetch `url` and return the response body as text.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| ScrapeApiError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("fetching source document");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| ScrapeApiError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeApiError::Network(format!("{url}: HTTP {status}")));
        }

        // Check content-length if available
        if let Some(len) = response.content_length() {
            if len > self.max_response_bytes {
                return Err(self.too_large(url, len));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeApiError::Network(format!("{url}: failed to read body: {e}")))?;

        // Chunked responses carry no content-length.
        if body.len() as u64 > self.max_response_bytes {
            return Err(self.too_large(url, body.len() as u64));
        }

        debug!(status = status.as_u16(), bytes = body.len(), "fetched source document");
        Ok(body)
    }

    fn too_large(&self, url: &str, len: u64) -> ScrapeApiError {
        ScrapeApiError::Network(format!(
            "{url}: response too large ({len} bytes, max {})",
            self.max_response_bytes
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig::default()).expect("build fetcher")
    }

    #[tokio::test]
    async fn test_fetch_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/page"))
            .and(wiremock::matchers::query_param("id", "7"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<ul><li>Foo</li></ul>"),
            )
            .mount(&server)
            .await;

        let body = fetcher()
            .fetch(&format!("{}/page?id=7", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<ul><li>Foo</li></ul>");
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::header("user-agent", "custom-agent/1.0"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let config = FetchConfig {
            user_agent: Some("custom-agent/1.0".into()),
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(&config).unwrap();
        assert_eq!(fetcher.fetch(&server.uri()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/missing"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeApiError::Network(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/big"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let config = FetchConfig {
            max_response_bytes: 16,
            ..FetchConfig::default()
        };
        let err = Fetcher::new(&config)
            .unwrap()
            .fetch(&format!("{}/big", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, ScrapeApiError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Port 9 (discard) on localhost is almost never listening.
        let err = fetcher().fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, ScrapeApiError::Network(_)));
    }
}
