//! In-memory collaborators for tests
//!
//! [`MockFetcher`] serves canned pages keyed by URL and records every request;
//! [`MockEnrichmentClient`] answers enrichment calls from canned replies keyed
//! by an instruction substring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::infrastructure::{
    EnrichmentClient, EnrichmentError, EnrichmentResult, FetchError, FetchedPage, PageFetcher,
    SessionFactory,
};

#[derive(Debug, Clone)]
enum Canned {
    Page { status: u16, body: String },
    TransportError,
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Unknown URLs answer 404 with an empty body
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(self, url: &str, body: impl Into<String>) -> Self {
        self.with_status(url, 200, body)
    }

    #[must_use]
    pub fn with_status(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.pages.insert(
            normalize(url),
            Canned::Page {
                status,
                body: body.into(),
            },
        );
        self
    }

    #[must_use]
    pub fn with_transport_error(mut self, url: &str) -> Self {
        self.pages.insert(normalize(url), Canned::TransportError);
        self
    }

    /// Delays the response for `url`
    #[must_use]
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(url), delay);
        self
    }

    /// Requested URLs in request order
    pub fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self, url: &str) -> usize {
        let url = normalize(url);
        self.requested()
            .iter()
            .filter(|requested| normalize(requested) == url)
            .count()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        let key = normalize(url);
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        match self.pages.get(&key) {
            Some(Canned::Page { status, body }) => Ok(FetchedPage {
                url: url.to_string(),
                status: *status,
                body: body.clone(),
            }),
            Some(Canned::TransportError) => Err(FetchError::Transport {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
            None => Ok(FetchedPage {
                url: url.to_string(),
                status: 404,
                body: String::new(),
            }),
        }
    }
}

/// Hands out the same shared [`MockFetcher`] for every request
#[derive(Debug, Clone)]
pub struct MockSessionFactory {
    fetcher: Arc<MockFetcher>,
}

impl MockSessionFactory {
    pub const fn new(fetcher: Arc<MockFetcher>) -> Self {
        Self { fetcher }
    }
}

impl SessionFactory for MockSessionFactory {
    fn open(&self) -> Result<Arc<dyn PageFetcher>, FetchError> {
        Ok(self.fetcher.clone())
    }
}

/// Replies to the first rule whose key occurs in the instructions; calls
/// matching no rule fail with an API error
#[derive(Debug, Default)]
pub struct MockEnrichmentClient {
    rules: Vec<(String, EnrichmentResult<String>)>,
    calls: Mutex<Vec<String>>,
}

impl MockEnrichmentClient {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reply_when(mut self, instruction_contains: &str, reply: impl Into<String>) -> Self {
        self.rules
            .push((instruction_contains.to_string(), Ok(reply.into())));
        self
    }

    #[must_use]
    pub fn fail_when(mut self, instruction_contains: &str, error: EnrichmentError) -> Self {
        self.rules.push((instruction_contains.to_string(), Err(error)));
        self
    }

    /// Payloads received, in call order
    pub fn payloads(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EnrichmentClient for MockEnrichmentClient {
    async fn send(&self, payload: &str, instructions: &str) -> EnrichmentResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(payload.to_string());
        }
        self.rules
            .iter()
            .find(|(key, _)| instructions.contains(key.as_str()))
            .map_or_else(
                || Err(EnrichmentError::Api("no canned reply".to_string())),
                |(_, reply)| reply.clone(),
            )
    }
}
