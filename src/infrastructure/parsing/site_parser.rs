//! Homepage-level extractors: metadata, important links, brand context

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use super::document::{attr, char_len, compile_selector, compile_selectors, normalized_text};
use super::error::ParsingError;
use super::landmarks::is_followable;
use crate::domain::{ImportantLinks, LinkCategory, StoreMetadata, StoreUrl};

const MIN_BRAND_CONTEXT_CHARS: usize = 50;

static TITLE: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("title"));
static META: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("meta"));
static JSON_LD: Lazy<Option<Selector>> =
    Lazy::new(|| compile_selector(r#"script[type="application/ld+json"]"#));
static ANCHORS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("a[href]"));

static BRAND_SECTIONS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[
        r#"[class*="about"]"#,
        r#"[class*="brand"]"#,
        r#"[class*="story"]"#,
        r#"[class*="mission"]"#,
        r#"[id*="about"]"#,
        r#"[id*="brand"]"#,
        r#"[id*="story"]"#,
    ])
});

/// Title, every meta name/property pair and the first JSON-LD block
pub fn extract_metadata(html: &str) -> StoreMetadata {
    let document = Html::parse_document(html);
    let mut metadata = StoreMetadata {
        title: TITLE
            .as_ref()
            .and_then(|selector| document.select(selector).next())
            .map(|title| title.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty()),
        ..StoreMetadata::default()
    };

    if let Some(selector) = META.as_ref() {
        for tag in document.select(selector) {
            let key = attr(tag, "name").or_else(|| attr(tag, "property"));
            if let (Some(key), Some(content)) = (key, attr(tag, "content")) {
                metadata.meta.insert(key.to_string(), content.to_string());
            }
        }
    }

    metadata.structured_data = JSON_LD.as_ref().and_then(|selector| {
        document.select(selector).find_map(|script| {
            let raw: String = script.text().collect();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(Value::Array(items)) => items.into_iter().next(),
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("{}", ParsingError::malformed_json("ld+json", e));
                    None
                }
            }
        })
    });

    metadata
}

/// One absolute URL per link category; keywords are tried in order and the
/// first anchor whose href contains the keyword wins
pub fn extract_important_links(html: &str, base: &StoreUrl) -> ImportantLinks {
    let document = Html::parse_document(html);
    let Some(anchors) = ANCHORS.as_ref() else {
        return ImportantLinks::new();
    };

    let hrefs: Vec<&str> = document
        .select(anchors)
        .filter_map(|anchor| attr(anchor, "href"))
        .filter(|href| is_followable(href))
        .collect();
    let lowered: Vec<String> = hrefs.iter().map(|href| href.to_lowercase()).collect();

    let mut links = ImportantLinks::new();
    for category in LinkCategory::ALL {
        let found = category.keywords().iter().find_map(|keyword| {
            lowered
                .iter()
                .position(|href| href.contains(keyword))
                .and_then(|index| base.join(hrefs[index]))
        });
        if let Some(url) = found {
            links.insert(category, url);
        }
    }
    links
}

/// About/brand/story section text, else the meta description
pub fn extract_brand_context(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let section = BRAND_SECTIONS.iter().find_map(|selector| {
        document
            .select(selector)
            .map(normalized_text)
            .find(|text| char_len(text) > MIN_BRAND_CONTEXT_CHARS)
    });

    section.or_else(|| {
        META.as_ref().and_then(|selector| {
            document
                .select(selector)
                .filter(|tag| {
                    attr(*tag, "name").is_some_and(|name| name.eq_ignore_ascii_case("description"))
                })
                .find_map(|tag| attr(tag, "content").map(str::to_string))
        })
    })
}
