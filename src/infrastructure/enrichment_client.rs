//! Language-model collaborator used by the enrichment stage
//!
//! The contract is `send(payload, instructions) -> free text`. Callers must
//! tolerate replies that are not the structure they asked for.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::config::EnrichmentConfig;

pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    /// Missing API key or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failure or timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response or empty completion
    #[error("API error: {0}")]
    Api(String),

    /// Reply did not contain the expected structure
    #[error("Parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    async fn send(&self, payload: &str, instructions: &str) -> EnrichmentResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
#[derive(Clone)]
pub struct ChatCompletionsClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatCompletionsClient {
    pub fn new(api_key: impl Into<String>, config: &EnrichmentConfig) -> EnrichmentResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| EnrichmentError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// `None` when enrichment is disabled or no API key is present
    pub fn from_config(config: &EnrichmentConfig) -> EnrichmentResult<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        match config.api_key() {
            Some(api_key) => Self::new(api_key, config).map(Some),
            None => {
                debug!(
                    env = %config.api_key_env,
                    "No enrichment API key found, enrichment disabled"
                );
                Ok(None)
            }
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EnrichmentClient for ChatCompletionsClient {
    async fn send(&self, payload: &str, instructions: &str) -> EnrichmentResult<String> {
        let start = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: instructions,
                },
                ChatMessage {
                    role: "user",
                    content: payload,
                },
            ],
            temperature: 0.1,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Enrichment request failed");
                EnrichmentError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Enrichment API error");
            return Err(EnrichmentError::Api(format!("{status}: {error_text}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| EnrichmentError::Api("Empty completion".into()))?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "Enrichment completion"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config_yields_no_client() {
        let config = EnrichmentConfig {
            enabled: false,
            ..EnrichmentConfig::default()
        };
        assert!(matches!(ChatCompletionsClient::from_config(&config), Ok(None)));
    }

    #[test]
    fn test_missing_key_yields_no_client() {
        let config = EnrichmentConfig {
            api_key_env: "STOREFRONT_INSIGHTS_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..EnrichmentConfig::default()
        };
        assert!(matches!(ChatCompletionsClient::from_config(&config), Ok(None)));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = EnrichmentConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..EnrichmentConfig::default()
        };
        let client = ChatCompletionsClient::new("key", &config).expect("client builds");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model(), config.model);
    }
}
