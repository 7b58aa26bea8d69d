//! Storefront Insights - structured insight extraction from public storefronts
//!
//! Given a store URL, the orchestrator fetches the homepage and runs nine
//! independent category tasks (product feed, hero products, policies, FAQs,
//! social handles, contact details, brand context, important links and
//! metadata). Each category degrades to an empty value on failure; an optional
//! enrichment stage overlays language-model output on the assembled record.

// Module declarations
pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export the main entry points
pub use application::{InsightError, InsightOrchestrator, InsightResult};
pub use domain::InsightRecord;
