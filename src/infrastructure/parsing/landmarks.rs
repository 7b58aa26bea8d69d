//! Page landmarks (footer, header, nav) and category link discovery
//!
//! A landmark is found by tag first, then by the first element whose class
//! contains the landmark name. Link plans pair the landmarks to scan with the
//! href keyword patterns of one insight category.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::document::{attr, compile_patterns, compile_selector, has_class_containing};
use crate::domain::StoreUrl;

static FOOTER_TAG: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("footer"));
static HEADER_TAG: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("header"));
static NAV_TAG: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("nav"));
static CLASSED: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("[class]"));
static ANCHORS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("a[href]"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Footer,
    Header,
    Nav,
}

impl Landmark {
    fn tag_selector(self) -> Option<&'static Selector> {
        match self {
            Self::Footer => FOOTER_TAG.as_ref(),
            Self::Header => HEADER_TAG.as_ref(),
            Self::Nav => NAV_TAG.as_ref(),
        }
    }

    const fn class_needles(self) -> &'static [&'static str] {
        match self {
            Self::Footer => &["footer"],
            Self::Header => &["header", "nav"],
            Self::Nav => &["nav"],
        }
    }

    /// First element acting as this landmark
    pub fn locate(self, document: &Html) -> Option<ElementRef<'_>> {
        if let Some(element) = self
            .tag_selector()
            .and_then(|selector| document.select(selector).next())
        {
            return Some(element);
        }

        CLASSED.as_ref().and_then(|selector| {
            document.select(selector).find(|element| {
                self.class_needles()
                    .iter()
                    .any(|needle| has_class_containing(*element, needle))
            })
        })
    }
}

/// Landmarks to scan and href patterns that mark a category link
#[derive(Debug, Clone)]
pub struct LinkPlan {
    pub category: &'static str,
    pub landmarks: &'static [Landmark],
    pub href_patterns: Vec<Regex>,
}

impl LinkPlan {
    fn new(category: &'static str, landmarks: &'static [Landmark], patterns: &[&str]) -> Self {
        Self {
            category,
            landmarks,
            href_patterns: compile_patterns(patterns),
        }
    }

    pub fn matches(&self, href: &str) -> bool {
        self.href_patterns.iter().any(|pattern| pattern.is_match(href))
    }

    /// Absolute, deduplicated category links in landmark order
    pub fn discover(&self, document: &Html, base: &StoreUrl) -> Vec<String> {
        let Some(anchors) = ANCHORS.as_ref() else {
            return Vec::new();
        };

        let mut links: Vec<String> = Vec::new();
        for landmark in self.landmarks {
            let Some(region) = landmark.locate(document) else {
                continue;
            };
            for anchor in region.select(anchors) {
                let Some(href) = attr(anchor, "href") else {
                    continue;
                };
                if !is_followable(href) || !self.matches(href) {
                    continue;
                }
                if let Some(url) = base.join(href) {
                    if !links.contains(&url) {
                        links.push(url);
                    }
                }
            }
        }
        links
    }
}

/// Skips fragments and non-HTTP schemes
pub fn is_followable(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    !(lower.starts_with('#')
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("javascript:"))
}

pub static FAQ_LINKS: Lazy<LinkPlan> = Lazy::new(|| {
    LinkPlan::new(
        "faq",
        &[Landmark::Footer, Landmark::Nav],
        &[
            r"(?i)faq",
            r"(?i)frequently[-\s]?asked[-\s]?questions",
            r"(?i)help",
            r"(?i)support",
        ],
    )
});

pub static PRIVACY_LINKS: Lazy<LinkPlan> = Lazy::new(|| {
    LinkPlan::new(
        "privacy_policy",
        &[Landmark::Footer, Landmark::Nav],
        &[
            r"(?i)privacy[-\s]?policy",
            r"(?i)privacy",
            r"(?i)data[-\s]?protection",
        ],
    )
});

pub static RETURN_LINKS: Lazy<LinkPlan> = Lazy::new(|| {
    LinkPlan::new(
        "return_policy",
        &[Landmark::Footer, Landmark::Nav],
        &[
            r"(?i)return[-\s]?policy",
            r"(?i)refund[-\s]?policy",
            r"(?i)return[-\s]?refund",
            r"(?i)return",
            r"(?i)refund",
        ],
    )
});

pub static CONTACT_LINKS: Lazy<LinkPlan> = Lazy::new(|| {
    LinkPlan::new(
        "contact",
        &[Landmark::Footer, Landmark::Header],
        &[r"(?i)contact"],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    const HOMEPAGE: &str = r##"
        <html><body>
          <div class="site-header"><a href="/pages/contact">Contact</a></div>
          <main><a href="/pages/faq-main">Not in a landmark</a></main>
          <footer>
            <a href="/pages/shipping-faq">FAQ</a>
            <a href="#support">Support</a>
            <a href="https://brand.example.com/pages/shipping-faq">FAQ again</a>
            <a href="/policies/privacy-policy">Privacy</a>
          </footer>
        </body></html>
    "##;

    #[test]
    fn test_footer_located_by_tag() {
        let document = Html::parse_document(HOMEPAGE);
        assert!(Landmark::Footer.locate(&document).is_some());
        let header = Landmark::Header.locate(&document).expect("header by class");
        assert!(has_class_containing(header, "header"));
    }

    #[test]
    fn test_discover_faq_links_in_footer() {
        let document = Html::parse_document(HOMEPAGE);
        let base = StoreUrl::parse("https://brand.example.com").expect("valid");
        let links = FAQ_LINKS.discover(&document, &base);
        assert_eq!(links, vec!["https://brand.example.com/pages/shipping-faq"]);
    }

    #[test]
    fn test_discover_contact_links_in_header() {
        let document = Html::parse_document(HOMEPAGE);
        let base = StoreUrl::parse("https://brand.example.com").expect("valid");
        assert_eq!(
            CONTACT_LINKS.discover(&document, &base),
            vec!["https://brand.example.com/pages/contact"]
        );
        assert_eq!(
            PRIVACY_LINKS.discover(&document, &base),
            vec!["https://brand.example.com/policies/privacy-policy"]
        );
    }

    #[test]
    fn test_followable_hrefs() {
        assert!(is_followable("/pages/faq"));
        assert!(!is_followable("mailto:help@brand.com"));
        assert!(!is_followable("#faq"));
    }
}
