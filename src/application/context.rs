//! Per-request store context shared by every category task

use std::sync::Arc;

use crate::domain::StoreUrl;
use crate::infrastructure::PageFetcher;
use crate::infrastructure::config::ExtractionConfig;

/// Cheap to clone: the session and homepage body are shared
#[derive(Clone)]
pub struct StoreContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub base: StoreUrl,
    /// Homepage body, when the initial fetch returned 200
    pub homepage: Option<Arc<str>>,
    pub config: Arc<ExtractionConfig>,
}

impl StoreContext {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        base: StoreUrl,
        homepage: Option<String>,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            fetcher,
            base,
            homepage: homepage.map(Arc::from),
            config: Arc::new(config),
        }
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    /// Absolute URL for a path relative to the store root
    pub fn url_for(&self, path: &str) -> Option<String> {
        self.base.join(path)
    }
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("base", &self.base.as_str())
            .field("homepage_bytes", &self.homepage.as_ref().map(|body| body.len()))
            .finish_non_exhaustive()
    }
}
