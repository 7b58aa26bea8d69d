//! Configuration management for the insights service
//!
//! Configuration is layered: compiled defaults, then an optional TOML/JSON file,
//! then `STOREFRONT_INSIGHTS_*` environment variables (`__` separates nested keys,
//! e.g. `STOREFRONT_INSIGHTS_HTTP__TIMEOUT_SECONDS=10`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "STOREFRONT_INSIGHTS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub extraction: ExtractionConfig,
    pub enrichment: EnrichmentConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Outbound HTTP session settings, applied per store request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// User agent sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum in-flight requests toward one store
    pub max_concurrent_requests: usize,
    /// Token bucket refill rate toward one store
    pub max_requests_per_second: u32,
    /// Whether to follow redirects (bounded)
    pub follow_redirects: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_concurrent_requests: defaults::MAX_CONCURRENT_REQUESTS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            follow_redirects: true,
        }
    }
}

/// Orchestration knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound for a single category task, in seconds
    pub category_timeout_seconds: u64,
    /// Scan homepage footer/nav links when direct probing finds nothing
    pub fallback_discovery: bool,
    /// Path of the public product feed
    pub product_feed_path: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            category_timeout_seconds: defaults::CATEGORY_TIMEOUT_SECONDS,
            fallback_discovery: true,
            product_feed_path: paths::PRODUCT_FEED.to_string(),
        }
    }
}

/// Language-model enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Enrichment runs only when this is set and the API key is present
    pub enabled: bool,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// OpenAI-compatible API base URL
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    /// Bytes of homepage markup sent for brand context
    pub homepage_excerpt_chars: usize,
    /// Products sent for catalog analysis
    pub product_sample_size: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: defaults::ENRICHMENT_API_KEY_ENV.to_string(),
            base_url: defaults::ENRICHMENT_BASE_URL.to_string(),
            model: defaults::ENRICHMENT_MODEL.to_string(),
            timeout_seconds: defaults::ENRICHMENT_TIMEOUT_SECONDS,
            homepage_excerpt_chars: defaults::HOMEPAGE_EXCERPT_CHARS,
            product_sample_size: defaults::PRODUCT_SAMPLE_SIZE,
        }
    }
}

impl EnrichmentConfig {
    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Upper bound for one `/fetch-insights` request
    pub request_timeout_seconds: u64,
    /// Directory served under `/static`
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::BIND_ADDRESS.to_string(),
            request_timeout_seconds: defaults::SERVER_REQUEST_TIMEOUT_SECONDS,
            static_dir: "static".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable daily rolling file output
    pub file_output: bool,

    /// Directory for log files
    pub log_dir: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: "logs".to_string(),
            module_filters: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional file and the environment.
    ///
    /// When `path` is `None` the user config directory is checked for
    /// `storefront-insights/config.toml`; a missing file there is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                info!("🔧 Loading configuration from {}", path.display());
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = Self::default_config_file() {
                    debug!("Checking default configuration at {}", default_path.display());
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let app_config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// `<user config dir>/storefront-insights/config.toml`
    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("storefront-insights").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("http.timeout_seconds must be > 0".into()));
        }
        if self.http.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "http.max_concurrent_requests must be > 0".into(),
            ));
        }
        if self.http.max_requests_per_second == 0 {
            return Err(ConfigError::Invalid(
                "http.max_requests_per_second must be > 0".into(),
            ));
        }
        if self.extraction.category_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "extraction.category_timeout_seconds must be > 0".into(),
            ));
        }
        if !self.extraction.product_feed_path.starts_with('/') {
            return Err(ConfigError::Invalid(
                "extraction.product_feed_path must start with '/'".into(),
            ));
        }
        if self.enrichment.enabled && self.enrichment.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "enrichment.timeout_seconds must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Default configuration values
pub mod defaults {
    /// Browser-like user agent; many storefronts reject obvious bots
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default maximum concurrent requests per store
    pub const MAX_CONCURRENT_REQUESTS: usize = 4;

    /// Default request rate per store
    pub const MAX_REQUESTS_PER_SECOND: u32 = 10;

    /// Default upper bound for a category task
    pub const CATEGORY_TIMEOUT_SECONDS: u64 = 60;

    pub const ENRICHMENT_API_KEY_ENV: &str = "OPENAI_API_KEY";
    pub const ENRICHMENT_BASE_URL: &str = "https://api.openai.com/v1";
    pub const ENRICHMENT_MODEL: &str = "gpt-4o-mini";
    pub const ENRICHMENT_TIMEOUT_SECONDS: u64 = 60;
    pub const HOMEPAGE_EXCERPT_CHARS: usize = 2000;
    pub const PRODUCT_SAMPLE_SIZE: usize = 10;

    pub const BIND_ADDRESS: &str = "0.0.0.0:8000";
    pub const SERVER_REQUEST_TIMEOUT_SECONDS: u64 = 180;

    /// Maximum FAQ pairs kept per store
    pub const MAX_FAQS: usize = 50;

    /// Maximum hero products kept per store
    pub const MAX_HERO_PRODUCTS: usize = 20;

    /// Product-path anchors scanned as a supplementary hero source
    pub const MAX_PRODUCT_LINKS_SCANNED: usize = 10;

    /// Cleaned policy text must be longer than this
    pub const MIN_POLICY_CHARS: usize = 200;
}

/// Conventional storefront paths probed in declared order
pub mod paths {
    pub const PRODUCT_FEED: &str = "/products.json";

    pub const FAQ: &[&str] = &[
        "/pages/faq",
        "/pages/frequently-asked-questions",
        "/pages/help",
        "/pages/support",
        "/faq",
        "/frequently-asked-questions",
        "/help",
        "/support",
        "/pages/faqs",
        "/faqs",
    ];

    pub const PRIVACY_POLICY: &[&str] = &[
        "/pages/privacy-policy",
        "/pages/privacy",
        "/privacy-policy",
        "/privacy",
        "/legal/privacy-policy",
        "/policies/privacy-policy",
    ];

    pub const RETURN_POLICY: &[&str] = &[
        "/pages/return-policy",
        "/pages/refund-policy",
        "/pages/return-refund-policy",
        "/return-policy",
        "/refund-policy",
        "/return-refund-policy",
        "/legal/return-policy",
        "/legal/refund-policy",
        "/policies/refund-policy",
        "/policies/return-policy",
    ];

    pub const CONTACT: &[&str] = &[
        "/pages/contact",
        "/pages/contact-us",
        "/contact",
        "/contact-us",
        "/pages/contact-form",
        "/contact-form",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.max_concurrent_requests, defaults::MAX_CONCURRENT_REQUESTS);
        assert_eq!(config.extraction.product_feed_path, "/products.json");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.http.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "[http]\ntimeout_seconds = 7\n\n[server]\nbind_address = \"127.0.0.1:9000\""
        )
        .expect("write config");

        let config = AppConfig::load(Some(file.path())).expect("config loads");
        assert_eq!(config.http.timeout_seconds, 7);
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        // Untouched sections keep their defaults
        assert_eq!(config.http.max_requests_per_second, defaults::MAX_REQUESTS_PER_SECOND);
        assert_eq!(config.enrichment.model, defaults::ENRICHMENT_MODEL);
    }

    #[test]
    fn test_invalid_file_value_rejected() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[http]\nmax_concurrent_requests = 0").expect("write config");

        assert!(AppConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_candidate_tables_are_relative() {
        for table in [paths::FAQ, paths::PRIVACY_POLICY, paths::RETURN_POLICY, paths::CONTACT] {
            assert!(table.iter().all(|path| path.starts_with('/')));
        }
    }
}
