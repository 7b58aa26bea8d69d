//! Data transfer objects for the HTTP surface
//!
//! Wire shapes exchanged between the API layer and the orchestrator.

use serde::{Deserialize, Serialize};

use crate::domain::InsightRecord;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchInsightsRequest {
    pub website_url: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchInsightsResponse {
    pub success: bool,
    pub data: Option<InsightRecord>,
    pub message: String,
}

impl From<InsightRecord> for FetchInsightsResponse {
    fn from(record: InsightRecord) -> Self {
        let message = format!(
            "Fetched insights for {} ({} of 9 categories populated)",
            record.store_url,
            record.populated_categories()
        );
        Self {
            success: true,
            data: Some(record),
            message,
        }
    }
}

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_record() {
        let response = FetchInsightsResponse::from(InsightRecord::empty("https://shop.example.com"));
        assert!(response.success);
        assert!(response.message.contains("0 of 9"));

        let json = serde_json::to_value(&response).expect("serializes");
        assert_eq!(json["data"]["website_url"], "https://shop.example.com");
    }
}
