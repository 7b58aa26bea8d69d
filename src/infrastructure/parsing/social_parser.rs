//! Social handle extraction
//!
//! Passes run in a fixed order and merge first-wins per platform:
//! anchor hrefs, `@handle` anchor text, free page text, then meta tags.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::document::{attr, compile_pattern, compile_patterns, compile_selector, normalized_text, page_text};
use super::strategy::StrategyChain;
use crate::domain::{SocialHandles, SocialPlatform};

/// Path segments that name a platform feature rather than an account
const RESERVED_SEGMENTS: &[&str] = &[
    "sharer",
    "sharer.php",
    "share",
    "intent",
    "watch",
    "pages",
    "p",
    "pin",
    "send",
    "profile.php",
    "home",
    "explore",
    "hashtag",
    "embed",
    "plugins",
    "dialog",
    "tr",
];

static ANCHORS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("a[href]"));
static META: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("meta[content]"));
static AT_HANDLE: Lazy<Option<Regex>> = Lazy::new(|| compile_pattern(r"@([A-Za-z0-9._]{2,})"));

static HREF_PATTERNS: Lazy<Vec<(SocialPlatform, Vec<Regex>)>> = Lazy::new(|| {
    SocialPlatform::ALL
        .iter()
        .map(|&platform| (platform, compile_patterns(href_patterns(platform))))
        .collect()
});

static KEYWORD_PATTERNS: Lazy<Vec<(SocialPlatform, Option<Regex>)>> = Lazy::new(|| {
    SocialPlatform::ALL
        .iter()
        .map(|&platform| {
            let pattern = format!(
                r"(?i)\b{}\s*(?::\s*@?|@)([A-Za-z0-9._]{{2,}})",
                platform.as_str()
            );
            (platform, compile_pattern(&pattern))
        })
        .collect()
});

const fn href_patterns(platform: SocialPlatform) -> &'static [&'static str] {
    match platform {
        SocialPlatform::Instagram => &[r"(?i)(?:^|//|\.)instagram\.com/([A-Za-z0-9._]+)"],
        SocialPlatform::Facebook => &[r"(?i)(?:^|//|\.)(?:facebook|fb)\.com/([A-Za-z0-9._-]+)"],
        SocialPlatform::Twitter => &[r"(?i)(?:^|//|\.)(?:twitter|x)\.com/([A-Za-z0-9_]+)"],
        SocialPlatform::Youtube => &[
            r"(?i)(?:^|//|\.)youtube\.com/(?:channel|user|c)/([A-Za-z0-9._-]+)",
            r"(?i)(?:^|//|\.)youtube\.com/@?([A-Za-z0-9._-]+)",
        ],
        SocialPlatform::Tiktok => &[r"(?i)(?:^|//|\.)tiktok\.com/@?([A-Za-z0-9._]+)"],
        SocialPlatform::Linkedin => {
            &[r"(?i)(?:^|//|\.)linkedin\.com/(?:company|in)/([A-Za-z0-9._-]+)"]
        }
        SocialPlatform::Pinterest => &[r"(?i)(?:^|//|\.)pinterest\.com/([A-Za-z0-9._-]+)"],
        SocialPlatform::Snapchat => &[r"(?i)(?:^|//|\.)snapchat\.com/add/([A-Za-z0-9._-]+)"],
        SocialPlatform::Whatsapp => &[r"(?i)(?:^|//|\.)(?:wa\.me|whatsapp\.com)/([A-Za-z0-9._+-]+)"],
    }
}

fn is_reserved(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    RESERVED_SEGMENTS.contains(&lower.as_str())
}

/// First account-like capture of any pattern in `text`
fn capture_handle<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .map(|handle| handle.as_str())
            .find(|handle| !is_reserved(handle))
    })
}

fn social_chain() -> StrategyChain<SocialHandles> {
    StrategyChain::new("social")
        .then("anchor_href", anchor_href_pass)
        .then("anchor_text", anchor_text_pass)
        .then("page_text", page_text_pass)
        .then("meta_tags", meta_tag_pass)
}

/// Handles per platform; earlier passes win
pub fn extract_social_handles(html: &str) -> SocialHandles {
    let document = Html::parse_document(html);
    social_chain().merge_all(&document)
}

fn anchor_hrefs(document: &Html) -> Vec<(&str, String)> {
    let Some(anchors) = ANCHORS.as_ref() else {
        return Vec::new();
    };
    document
        .select(anchors)
        .filter_map(|anchor| attr(anchor, "href").map(|href| (href, normalized_text(anchor))))
        .collect()
}

fn anchor_href_pass(document: &Html) -> SocialHandles {
    let mut handles = SocialHandles::default();
    for (href, _) in anchor_hrefs(document) {
        for (platform, patterns) in HREF_PATTERNS.iter() {
            if let Some(handle) = capture_handle(patterns, href) {
                handles.insert_if_absent(*platform, handle);
            }
        }
    }
    handles
}

fn anchor_text_pass(document: &Html) -> SocialHandles {
    let mut handles = SocialHandles::default();
    let Some(at_handle) = AT_HANDLE.as_ref() else {
        return handles;
    };
    for (href, text) in anchor_hrefs(document) {
        let href = href.to_ascii_lowercase();
        let Some(handle) = at_handle.captures(&text).and_then(|captures| captures.get(1)) else {
            continue;
        };
        for platform in SocialPlatform::ALL {
            if platform.domains().iter().any(|domain| href.contains(domain)) {
                handles.insert_if_absent(platform, handle.as_str());
            }
        }
    }
    handles
}

fn page_text_pass(document: &Html) -> SocialHandles {
    let text = page_text(document);
    let mut handles = SocialHandles::default();
    for (platform, keyword) in KEYWORD_PATTERNS.iter() {
        let from_keyword = keyword
            .as_ref()
            .and_then(|pattern| capture_handle(std::slice::from_ref(pattern), &text));
        let from_url = || {
            HREF_PATTERNS
                .iter()
                .find(|(candidate, _)| candidate == platform)
                .and_then(|(_, patterns)| capture_handle(patterns, &text))
        };
        if let Some(handle) = from_keyword.or_else(from_url) {
            handles.insert_if_absent(*platform, handle);
        }
    }
    handles
}

fn meta_tag_pass(document: &Html) -> SocialHandles {
    let mut handles = SocialHandles::default();
    let Some(meta) = META.as_ref() else {
        return handles;
    };
    for tag in document.select(meta) {
        let Some(content) = attr(tag, "content") else {
            continue;
        };
        let key = attr(tag, "property")
            .or_else(|| attr(tag, "name"))
            .unwrap_or_default()
            .to_ascii_lowercase();
        match key.as_str() {
            "og:site_name" => {
                let compact: String = content.split_whitespace().collect();
                for platform in [
                    SocialPlatform::Facebook,
                    SocialPlatform::Instagram,
                    SocialPlatform::Linkedin,
                ] {
                    handles.insert_if_absent(platform, &compact);
                }
            }
            "twitter:site" | "twitter:creator" => {
                handles.insert_if_absent(SocialPlatform::Twitter, content);
            }
            _ => {}
        }
    }
    handles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_hrefs_resolve_each_platform() {
        let handles = extract_social_handles(
            r#"
            <html><body><footer>
              <a href="https://www.instagram.com/BrandX/?hl=en">IG</a>
              <a href="https://facebook.com/sharer/sharer.php?u=x">Share</a>
              <a href="https://www.facebook.com/brandxofficial">FB</a>
              <a href="https://x.com/brandx_hq">X</a>
              <a href="https://www.youtube.com/channel/UC123abc">YT</a>
              <a href="https://www.tiktok.com/@brandx.tok">TikTok</a>
              <a href="https://www.linkedin.com/company/brand-x">LinkedIn</a>
              <a href="https://wa.me/15551234567">Chat</a>
              <a href="https://dropbox.com/brandx">Not social</a>
            </footer></body></html>
            "#,
        );

        assert_eq!(handles.get(SocialPlatform::Instagram), Some("BrandX"));
        assert_eq!(handles.get(SocialPlatform::Facebook), Some("brandxofficial"));
        assert_eq!(handles.get(SocialPlatform::Twitter), Some("brandx_hq"));
        assert_eq!(handles.get(SocialPlatform::Youtube), Some("UC123abc"));
        assert_eq!(handles.get(SocialPlatform::Tiktok), Some("brandx.tok"));
        assert_eq!(handles.get(SocialPlatform::Linkedin), Some("brand-x"));
        assert_eq!(handles.get(SocialPlatform::Whatsapp), Some("15551234567"));
        assert_eq!(handles.len(), 7);
    }

    #[test]
    fn test_link_pass_wins_over_text_pass() {
        let handles = extract_social_handles(
            r#"
            <html><body>
              <a href="https://instagram.com/brandx">Follow us</a>
              <p>Instagram: @other</p>
            </body></html>
            "#,
        );
        assert_eq!(handles.get(SocialPlatform::Instagram), Some("brandx"));
    }

    #[test]
    fn test_anchor_text_handle() {
        let handles = extract_social_handles(
            r#"<html><body><a href="https://pinterest.com/pin/12345">@brandpins</a></body></html>"#,
        );
        assert_eq!(handles.get(SocialPlatform::Pinterest), Some("brandpins"));
    }

    #[test]
    fn test_page_text_keywords() {
        let handles = extract_social_handles(
            r#"<html><body><p>Find us on TikTok @brandx_tok and snapchat: brandsnap</p></body></html>"#,
        );
        assert_eq!(handles.get(SocialPlatform::Tiktok), Some("brandx_tok"));
        assert_eq!(handles.get(SocialPlatform::Snapchat), Some("brandsnap"));
        assert!(!handles.contains(SocialPlatform::Instagram));
    }

    #[test]
    fn test_meta_tags_are_last_resort() {
        let handles = extract_social_handles(
            r#"
            <html><head>
              <meta property="og:site_name" content="Brand X">
              <meta name="twitter:site" content="@brandx">
            </head><body>
              <a href="https://instagram.com/brandx.official">IG</a>
            </body></html>
            "#,
        );

        assert_eq!(handles.get(SocialPlatform::Instagram), Some("brandx.official"));
        assert_eq!(handles.get(SocialPlatform::Facebook), Some("BrandX"));
        assert_eq!(handles.get(SocialPlatform::Linkedin), Some("BrandX"));
        assert_eq!(handles.get(SocialPlatform::Twitter), Some("brandx"));
    }

    #[test]
    fn test_scripts_do_not_leak_handles() {
        let handles = extract_social_handles(
            r#"<html><body><script>var url = "https://instagram.com/tracker";</script></body></html>"#,
        );
        assert!(handles.is_empty());
    }
}
