use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::UpstreamConfig;
use crate::errors::{FetchError, FetchResult};
use crate::utils::url::UrlUtils;

/// A fully buffered upstream response
///
/// Held by the interceptor for the duration of a single request only.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// 200 response with no headers
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), body)
    }
}

/// Capability to GET an absolute upstream URL
///
/// The relay core depends only on this trait. Connection pooling, timeouts and
/// TLS are the implementation's concern; the core never retries.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// Fetch `url` and return status, headers and the complete body.
    ///
    /// Any HTTP status is a successful fetch; only transport failures are errors.
    async fn fetch(&self, url: &Url) -> FetchResult<UpstreamResponse>;
}

/// reqwest-backed fetcher sharing one connection pool for the process lifetime
#[derive(Clone)]
pub struct HttpUpstreamFetcher {
    client: Client,
}

impl HttpUpstreamFetcher {
    /// Build the shared client from upstream configuration
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create upstream HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamFetcher for HttpUpstreamFetcher {
    async fn fetch(&self, url: &Url) -> FetchResult<UpstreamResponse> {
        let display_url = UrlUtils::obfuscate_credentials(url.as_str());
        debug!(url = %display_url, "Fetching upstream resource");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(display_url.clone(), &e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(display_url.clone(), &e))?;

        debug!(
            url = %display_url,
            status = status.as_u16(),
            bytes = body.len(),
            "Upstream response received"
        );

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;
    use std::time::Duration;

    #[test]
    fn test_build_from_config() {
        let config = UpstreamConfig {
            base_url: "http://origin.example".to_string(),
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(2),
            user_agent: "test-agent".to_string(),
        };
        assert!(HttpUpstreamFetcher::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_fetch_error() {
        let config = UpstreamConfig {
            connect_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_secs(1),
            ..UpstreamConfig::default()
        };
        let fetcher = HttpUpstreamFetcher::new(&config).unwrap();

        // Port 9 (discard) on loopback is closed in test environments
        let url = Url::parse("http://127.0.0.1:9/playlist.m3u8").unwrap();
        let result = fetcher.fetch(&url).await;
        assert!(result.is_err(), "closed port must not yield a response");
    }

    #[test]
    fn test_upstream_response_ok() {
        let response = UpstreamResponse::ok(&b"body"[..]);
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.headers.is_empty());
        assert_eq!(response.body, Bytes::from_static(b"body"));
    }
}
