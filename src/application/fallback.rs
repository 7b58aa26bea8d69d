//! Fallback discovery through homepage landmark links
//!
//! Used only after direct probing came back empty. Links are discovered in the
//! homepage footer/header/nav, fetched in order and run through the category
//! extractor.

use scraper::Html;
use tracing::{debug, trace};

use super::context::StoreContext;
use crate::infrastructure::parsing::{Extracted, LinkPlan, Mergeable};

pub struct FallbackLinkResolver<'a> {
    context: &'a StoreContext,
}

impl<'a> FallbackLinkResolver<'a> {
    pub const fn new(context: &'a StoreContext) -> Self {
        Self { context }
    }

    /// Absolute candidate links for `plan`; empty without a homepage
    pub fn discover(&self, plan: &LinkPlan) -> Vec<String> {
        let Some(homepage) = self.context.homepage() else {
            return Vec::new();
        };
        let document = Html::parse_document(homepage);
        let links = plan.discover(&document, &self.context.base);
        debug!(category = plan.category, links = links.len(), "Landmark links discovered");
        links
    }

    /// First discovered link whose page yields a non-empty extraction
    pub async fn first_success<T, F>(&self, plan: &LinkPlan, extract: F) -> T
    where
        T: Extracted + Default + Send,
        F: Fn(&str) -> T + Sync,
    {
        for link in self.discover(plan) {
            let Some(body) = self.context.fetcher.get_ok(&link).await else {
                continue;
            };
            let result = extract(&body);
            if !result.is_empty() {
                debug!(category = plan.category, url = %link, "Fallback link accepted");
                return result;
            }
            trace!(category = plan.category, url = %link, "Fallback link yielded nothing");
        }
        T::default()
    }

    /// Every discovered link's extraction merged into `seed`, in link order
    pub async fn merge_all<T, F>(&self, plan: &LinkPlan, seed: T, extract: F) -> T
    where
        T: Mergeable + Send,
        F: Fn(&str) -> T + Sync,
    {
        let mut merged = seed;
        for link in self.discover(plan) {
            if let Some(body) = self.context.fetcher.get_ok(&link).await {
                merged.merge(extract(&body));
            }
        }
        merged
    }

    /// Runs the extractor against the homepage body itself
    pub fn homepage_pass<T, F>(&self, extract: F) -> T
    where
        T: Extracted + Default,
        F: Fn(&str) -> T,
    {
        self.context.homepage().map(extract).unwrap_or_default()
    }
}
