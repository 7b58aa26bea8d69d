//! Candidate URL probing
//!
//! Paths are tried in declared order. A candidate is accepted only when it
//! answers 200 and the category extractor yields something; any other outcome
//! moves on to the next path.

use tracing::{debug, trace};

use super::context::StoreContext;
use crate::infrastructure::parsing::Extracted;

pub struct CandidateUrlProbe<'a> {
    context: &'a StoreContext,
    category: &'static str,
}

impl<'a> CandidateUrlProbe<'a> {
    pub const fn new(context: &'a StoreContext, category: &'static str) -> Self {
        Self { context, category }
    }

    /// First non-empty extraction over `paths`; empty when all candidates are
    /// exhausted
    pub async fn first_match<T, F>(&self, paths: &[&str], extract: F) -> T
    where
        T: Extracted + Default,
        F: Fn(&str) -> T + Sync,
    {
        for path in paths {
            let Some(url) = self.context.url_for(path) else {
                continue;
            };
            let Some(body) = self.context.fetcher.get_ok(&url).await else {
                continue;
            };
            let result = extract(&body);
            if result.is_empty() {
                trace!(category = self.category, url = %url, "Candidate yielded nothing");
                continue;
            }
            debug!(category = self.category, url = %url, "Candidate accepted");
            return result;
        }
        debug!(
            category = self.category,
            candidates = paths.len(),
            "No candidate path matched"
        );
        T::default()
    }
}
