//! Ordered extraction strategies over one parsed document
//!
//! A [`StrategyChain`] holds pure `(document) -> result` functions in priority
//! order. [`StrategyChain::run`] commits to the first strategy producing a
//! non-empty result; [`StrategyChain::merge_all`] runs every strategy and folds
//! the results with the category's merge rule.

use scraper::Html;
use tracing::trace;

use crate::domain::{ContactDetails, Faq, HeroProduct, SocialHandles};

/// Emptiness test used to decide whether a strategy succeeded
pub trait Extracted {
    fn is_empty(&self) -> bool;
}

impl<T> Extracted for Option<T> {
    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

impl Extracted for Vec<Faq> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl Extracted for Vec<HeroProduct> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl Extracted for ContactDetails {
    fn is_empty(&self) -> bool {
        Self::is_empty(self)
    }
}

impl Extracted for SocialHandles {
    fn is_empty(&self) -> bool {
        Self::is_empty(self)
    }
}

/// Categories that combine results across passes instead of short-circuiting
pub trait Mergeable: Extracted + Default {
    fn merge(&mut self, later: Self);
}

impl Mergeable for ContactDetails {
    fn merge(&mut self, later: Self) {
        Self::merge(self, later);
    }
}

impl Mergeable for SocialHandles {
    fn merge(&mut self, later: Self) {
        self.merge_first_wins(later);
    }
}

pub type Strategy<T> = fn(&Html) -> T;

pub struct StrategyChain<T> {
    category: &'static str,
    strategies: Vec<(&'static str, Strategy<T>)>,
}

impl<T: Extracted> StrategyChain<T> {
    pub const fn new(category: &'static str) -> Self {
        Self {
            category,
            strategies: Vec::new(),
        }
    }

    /// Appends a strategy at the lowest priority so far
    #[must_use]
    pub fn then(mut self, name: &'static str, strategy: Strategy<T>) -> Self {
        self.strategies.push((name, strategy));
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Result of the first strategy that yields something, with its name
    pub fn first_success(&self, document: &Html) -> Option<(&'static str, T)> {
        self.strategies.iter().find_map(|(name, strategy)| {
            let result = strategy(document);
            if result.is_empty() {
                trace!(category = self.category, strategy = name, "Strategy yielded nothing");
                None
            } else {
                trace!(category = self.category, strategy = name, "Strategy succeeded");
                Some((*name, result))
            }
        })
    }

    pub fn run(&self, document: &Html) -> T
    where
        T: Default,
    {
        self.first_success(document)
            .map(|(_, result)| result)
            .unwrap_or_default()
    }
}

impl<T: Mergeable> StrategyChain<T> {
    /// Runs every strategy in order, merging each result into the first
    pub fn merge_all(&self, document: &Html) -> T {
        self.strategies
            .iter()
            .fold(T::default(), |mut merged, (name, strategy)| {
                let result = strategy(document);
                trace!(
                    category = self.category,
                    strategy = name,
                    empty = result.is_empty(),
                    "Merging strategy result"
                );
                merged.merge(result);
                merged
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SocialPlatform;

    fn nothing(_: &Html) -> Vec<Faq> {
        Vec::new()
    }

    fn first(_: &Html) -> Vec<Faq> {
        vec![Faq::new("first question?", "first answer")]
    }

    fn second(_: &Html) -> Vec<Faq> {
        vec![Faq::new("second question?", "second answer")]
    }

    fn early_pass(_: &Html) -> SocialHandles {
        let mut handles = SocialHandles::default();
        handles.insert_if_absent(SocialPlatform::Instagram, "brandx");
        handles
    }

    fn late_pass(_: &Html) -> SocialHandles {
        let mut handles = SocialHandles::default();
        handles.insert_if_absent(SocialPlatform::Instagram, "other");
        handles.insert_if_absent(SocialPlatform::Youtube, "brandtube");
        handles
    }

    #[test]
    fn test_first_success_short_circuits() {
        let document = Html::parse_document("<p></p>");
        let chain = StrategyChain::new("faq")
            .then("nothing", nothing)
            .then("first", first)
            .then("second", second);

        let (name, faqs) = chain.first_success(&document).expect("a strategy succeeds");
        assert_eq!(name, "first");
        assert_eq!(faqs, first(&document));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_all_empty_yields_default() {
        let document = Html::parse_document("<p></p>");
        let chain = StrategyChain::new("faq").then("nothing", nothing);
        assert!(chain.run(&document).is_empty());
    }

    #[test]
    fn test_merge_keeps_earlier_pass() {
        let document = Html::parse_document("<p></p>");
        let chain = StrategyChain::new("social")
            .then("early", early_pass)
            .then("late", late_pass);

        let handles = chain.merge_all(&document);
        assert_eq!(handles.get(SocialPlatform::Instagram), Some("brandx"));
        assert_eq!(handles.get(SocialPlatform::Youtube), Some("brandtube"));
    }
}
