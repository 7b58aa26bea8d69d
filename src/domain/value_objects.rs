//! # Domain Value Objects
//!
//! Validated value types for the insight domain. Each constructor either
//! returns a well-formed value or a [`ValidationError`]; extractors drop
//! candidates that fail instead of storing partial fragments.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

static EMAIL_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").ok());

/// Digit count bounds for a plausible phone number
pub const MIN_PHONE_DIGITS: usize = 7;
pub const MAX_PHONE_DIGITS: usize = 15;

/// Shortest accepted social handle
pub const MIN_HANDLE_CHARS: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Store URL is empty")]
    EmptyUrl,

    #[error("Invalid store URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Invalid email address '{0}'")]
    InvalidEmail(String),

    #[error("Invalid phone number '{input}' ({digits} digits)")]
    InvalidPhone { input: String, digits: usize },

    #[error("Social handle '{0}' is too short")]
    HandleTooShort(String),
}

/// Validated storefront base URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreUrl {
    display: String,
    url: Url,
}

impl StoreUrl {
    /// Parses user input. A missing scheme defaults to `https://`; trailing
    /// slashes are dropped from the display form.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&candidate).map_err(|e| ValidationError::InvalidUrl {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(ValidationError::InvalidUrl {
                input: trimmed.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(Self {
            display: candidate.trim_end_matches('/').to_string(),
            url,
        })
    }

    /// Base URL without a trailing slash
    pub fn as_str(&self) -> &str {
        &self.display
    }

    pub const fn as_url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Resolves a relative path or href against the base
    pub fn join(&self, href: &str) -> Option<String> {
        self.url.join(href.trim()).ok().map(String::from)
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Email address accepted only on a full-pattern match
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(candidate: &str) -> Result<Self, ValidationError> {
        let candidate = candidate.trim();
        let valid = EMAIL_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(candidate));
        if valid {
            Ok(Self(candidate.to_string()))
        } else {
            Err(ValidationError::InvalidEmail(candidate.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Phone number normalized to its digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(candidate: &str) -> Result<Self, ValidationError> {
        let digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
        if (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
            Ok(Self(digits))
        } else {
            Err(ValidationError::InvalidPhone {
                input: candidate.trim().to_string(),
                digits: digits.len(),
            })
        }
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Cleaned social handle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocialHandle(String);

impl SocialHandle {
    /// Strips URL residue (`@`, query, fragment, trailing slash) and checks length
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let cleaned = raw
            .trim()
            .trim_start_matches('@')
            .split(['?', '#', '/'])
            .next()
            .unwrap_or_default()
            .trim_end_matches(['.', ',', ';', ':'])
            .to_string();

        if cleaned.chars().count() >= MIN_HANDLE_CHARS {
            Ok(Self(cleaned))
        } else {
            Err(ValidationError::HandleTooShort(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}
