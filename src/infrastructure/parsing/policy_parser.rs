//! Policy text extraction
//!
//! Content regions are tried in priority order; the first region whose cleaned
//! text clears the length threshold wins. The whole page is the last resort.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::document::{char_len, collapse_whitespace, compile_pattern, compile_selectors, joined_text};
use super::strategy::StrategyChain;
use crate::infrastructure::config::defaults::MIN_POLICY_CHARS;

static CONTENT_REGIONS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[
        "main",
        r#"[role="main"]"#,
        ".main-content",
        ".content",
        ".page-content",
        ".policy-content",
        ".legal-content",
        "article",
    ])
});

static NAVIGATION_TOKENS: Lazy<Option<Regex>> = Lazy::new(|| {
    compile_pattern(
        r"(?i)\b(?:home|shop|about|contact|cart|account|login|register|search|menu|close|back|next|previous)\b",
    )
});

/// Collapses whitespace and strips navigation chrome
pub fn clean_policy_text(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    match NAVIGATION_TOKENS.as_ref() {
        Some(tokens) => collapse_whitespace(&tokens.replace_all(&collapsed, "")),
        None => collapsed,
    }
}

fn accept(raw: &str) -> Option<String> {
    let cleaned = clean_policy_text(raw);
    (char_len(&cleaned) > MIN_POLICY_CHARS).then_some(cleaned)
}

fn content_region_strategy(document: &Html) -> Option<String> {
    CONTENT_REGIONS.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .and_then(|region| accept(&joined_text(region, " ")))
    })
}

fn whole_page_strategy(document: &Html) -> Option<String> {
    accept(&joined_text(document.root_element(), " "))
}

fn policy_chain() -> StrategyChain<Option<String>> {
    StrategyChain::new("policy")
        .then("content_region", content_region_strategy)
        .then("whole_page", whole_page_strategy)
}

/// Cleaned policy text, or `None` when nothing clears the threshold
pub fn extract_policy(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    policy_chain().run(&document)
}
