//! Errors surfaced to callers of the insight pipeline
//!
//! Everything below the orchestrator degrades to empty fields; only failing to
//! reach the store at all becomes an [`InsightError`].

use serde::Serialize;
use thiserror::Error;

use crate::domain::ValidationError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    #[error("Invalid store URL: {0}")]
    InvalidStoreUrl(#[from] ValidationError),

    #[error("Store not found at {url}: {reason}")]
    StoreNotFound { url: String, reason: String },

    #[error("Access to {url} denied (HTTP {status})")]
    Unauthorized { url: String, status: u16 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Caller-facing error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    Unauthorized,
    Internal,
}

impl InsightError {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidStoreUrl(_) | Self::StoreNotFound { .. } => ErrorCategory::NotFound,
            Self::Unauthorized { .. } => ErrorCategory::Unauthorized,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    pub fn not_found(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StoreNotFound {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

pub type InsightResult<T> = Result<T, InsightError>;
