//! Shared document helpers: selector/pattern compilation and text extraction
//!
//! Text helpers skip the contents of `script`, `style`, `noscript` and
//! `template` elements so extractors only ever see rendered text.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector, node::Node};
use tracing::warn;

use super::error::ParsingError;

static WHITESPACE: Lazy<Option<Regex>> = Lazy::new(|| compile_pattern(r"\s+"));

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Compile a selector list, skipping (and logging) invalid entries
pub fn compile_selectors(css: &[&str]) -> Vec<Selector> {
    css.iter().filter_map(|selector| compile_selector(selector)).collect()
}

pub fn compile_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("{}", ParsingError::invalid_selector(css, e));
            None
        }
    }
}

/// Compile regex patterns, skipping (and logging) invalid entries
pub fn compile_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|pattern| compile_pattern(pattern)).collect()
}

pub fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!("{}", ParsingError::invalid_pattern(pattern, e));
            None
        }
    }
}

/// Rendered text nodes under `element`, in document order, untrimmed
pub fn text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.descendants().filter_map(|node| {
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        match node.value() {
            Node::Text(text) if !hidden => Some(&**text),
            _ => None,
        }
    })
}

/// Trimmed, non-empty text nodes joined with `separator`
pub fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    text_nodes(element)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Element text with whitespace collapsed to single spaces
pub fn normalized_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&joined_text(element, " "))
}

/// Trimmed, non-empty text lines of an element
pub fn text_lines(element: ElementRef<'_>) -> Vec<String> {
    text_nodes(element)
        .flat_map(str::lines)
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Rendered text of the whole document, one text node per line
pub fn page_text(document: &Html) -> String {
    joined_text(document.root_element(), "\n")
}

pub fn collapse_whitespace(text: &str) -> String {
    match WHITESPACE.as_ref() {
        Some(whitespace) => whitespace.replace_all(text.trim(), " ").into_owned(),
        None => text.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Character (not byte) length
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Non-empty, trimmed attribute value
pub fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// True when any class token contains `needle` (ASCII case-insensitive)
pub fn has_class_containing(element: ElementRef<'_>, needle: &str) -> bool {
    element
        .value()
        .classes()
        .any(|class| class.to_ascii_lowercase().contains(needle))
}

/// First descendant matched by the earliest selector in priority order
pub fn select_first<'a>(element: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| element.select(selector).next())
}
