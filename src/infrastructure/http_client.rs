//! HTTP session for storefront fetching with rate limiting and bounded concurrency
//!
//! One [`HttpClient`] is opened per store request and shared read-only by every
//! category task through the [`PageFetcher`] trait. Non-200 responses are not
//! errors here: callers decide what a status means. Transport failures and
//! timeouts surface as [`FetchError`].

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::infrastructure::config::HttpConfig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("HTTP session could not be created: {0}")]
    Session(String),
}

/// Status and body of one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Read-only fetch handle shared by all tasks of one request
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// `GET url` with a bounded timeout
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Body of a 200 response; any other status or error reads as "not found"
    async fn get_ok(&self, url: &str) -> Option<String> {
        match self.get(url).await {
            Ok(page) if page.is_ok() => Some(page.body),
            Ok(page) => {
                debug!(url, status = page.status, "Candidate returned non-200");
                None
            }
            Err(e) => {
                debug!(url, error = %e, "Candidate fetch failed");
                None
            }
        }
    }
}

/// Creates one fetch session per store request
pub trait SessionFactory: Send + Sync {
    fn open(&self) -> Result<Arc<dyn PageFetcher>, FetchError>;
}

/// reqwest-backed session with per-store politeness limits
pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    in_flight: Semaphore,
    timeout_seconds: u64,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| FetchError::Session(e.to_string()))?;

        let per_second = NonZeroU32::new(config.max_requests_per_second)
            .ok_or_else(|| FetchError::Session("Rate limit must be greater than 0".into()))?;
        if config.max_concurrent_requests == 0 {
            return Err(FetchError::Session(
                "Concurrency limit must be greater than 0".into(),
            ));
        }

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
            in_flight: Semaphore::new(config.max_concurrent_requests),
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;

        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|e| FetchError::Session(e.to_string()))?;
        self.rate_limiter.until_ready().await;

        debug!("🌐 GET {}", url);
        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout_seconds,
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read body from {}: {}", url, e);
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!(url, status, bytes = body.len(), "Fetched");
        Ok(FetchedPage {
            url: final_url,
            status,
            body,
        })
    }
}

/// Opens an [`HttpClient`] from configuration for every request
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    config: HttpConfig,
}

impl HttpSessionFactory {
    pub const fn new(config: HttpConfig) -> Self {
        Self { config }
    }
}

impl SessionFactory for HttpSessionFactory {
    fn open(&self) -> Result<Arc<dyn PageFetcher>, FetchError> {
        Ok(Arc::new(HttpClient::new(&self.config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_config() {
        let config = HttpConfig {
            max_requests_per_second: 5,
            timeout_seconds: 10,
            ..HttpConfig::default()
        };
        let client = HttpClient::new(&config).expect("client builds");
        assert_eq!(client.timeout_seconds, 10);
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = HttpConfig {
            max_requests_per_second: 0,
            ..HttpConfig::default()
        };
        assert!(matches!(HttpClient::new(&config), Err(FetchError::Session(_))));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = HttpConfig {
            max_concurrent_requests: 0,
            ..HttpConfig::default()
        };
        assert!(HttpClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error() {
        let client = HttpClient::new(&HttpConfig::default()).expect("client builds");
        let result = client.get("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
        assert_eq!(client.get_ok("not a url").await, None);
    }

    #[test]
    fn test_session_factory_opens_client() {
        let factory = HttpSessionFactory::new(HttpConfig::default());
        tokio_test::assert_ok!(factory.open());
    }
}
