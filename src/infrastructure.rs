//! Infrastructure layer for HTTP sessions, HTML extraction and external integrations
//!
//! This module provides configuration loading, logging setup, the per-request
//! fetch session, the enrichment collaborator and the category extractors.

pub mod config; // Layered configuration and path tables
pub mod enrichment_client;
pub mod http_client;
pub mod logging; // Logging infrastructure
pub mod parsing;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError};
pub use enrichment_client::{
    ChatCompletionsClient, EnrichmentClient, EnrichmentError, EnrichmentResult,
};
pub use http_client::{
    FetchError, FetchedPage, HttpClient, HttpSessionFactory, PageFetcher, SessionFactory,
};
pub use logging::{init_logging, init_logging_with_config};
pub use parsing::{ParsingError, ParsingResult};
