//! Application layer - orchestration of the insight pipeline
//!
//! Category tasks compose the parsing chains with URL probing and landmark
//! fallback; the orchestrator fans them out per store and the optional
//! enrichment stage overlays model output on the assembled record.

pub mod category_tasks;
pub mod context;
pub mod dto;
pub mod enrichment_stage;
pub mod error;
pub mod fallback;
pub mod orchestrator;
pub mod probe;

// Re-export commonly used items
pub use context::StoreContext;
pub use dto::{ErrorBody, FetchInsightsRequest, FetchInsightsResponse};
pub use enrichment_stage::EnrichmentStage;
pub use error::{ErrorCategory, InsightError, InsightResult};
pub use fallback::FallbackLinkResolver;
pub use orchestrator::InsightOrchestrator;
pub use probe::CandidateUrlProbe;
