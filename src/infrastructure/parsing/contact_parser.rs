//! Contact detail extraction
//!
//! Every pass runs and the results are unioned. Emails and phones are
//! validated and deduplicated as they are added to [`ContactDetails`].

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::document::{
    attr, char_len, compile_patterns, compile_selector, compile_selectors, joined_text,
    normalized_text,
};
use super::landmarks::Landmark;
use super::strategy::StrategyChain;
use crate::domain::ContactDetails;

/// Minimum address length in characters
const MIN_ADDRESS_CHARS: usize = 10;

/// Platforms recognised as contact social links
const SOCIAL_LINK_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "pinterest.com",
    "snapchat.com",
];

const CONTACT_FORM_KEYWORDS: &[&str] = &["contact", "message", "inquiry", "support"];

static MAILTO_LINKS: Lazy<Option<Selector>> =
    Lazy::new(|| compile_selector(r#"a[href^="mailto:" i]"#));
static TEL_LINKS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector(r#"a[href^="tel:" i]"#));
static ANCHORS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("a[href]"));
static FORMS: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("form"));
static ADDRESS_TAG: Lazy<Option<Selector>> = Lazy::new(|| compile_selector("address"));
static ADDRESS_CLASSES: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&[
        r#"[class*="address"]"#,
        r#"[class*="location"]"#,
        r#"[class*="contact"]"#,
    ])
});

static EMAIL_IN_TEXT: Lazy<Vec<Regex>> =
    Lazy::new(|| compile_patterns(&[r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"]));

static PHONE_IN_TEXT: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_patterns(&[
        r"\+?\d[\d \-()]{8,}\d",
        r"\(\d{3}\)\s*\d{3}-\d{4}",
        r"\d{3}\.\d{3}\.\d{4}",
    ])
});

fn contact_chain() -> StrategyChain<ContactDetails> {
    StrategyChain::new("contact")
        .then("mailto_links", |document| mailto_emails(document.root_element()))
        .then("tel_links", |document| tel_phones(document.root_element()))
        .then("text_scan", |document| text_contacts(document.root_element()))
        .then("address", |document| address(document.root_element()))
        .then("social_links", |document| social_links(document.root_element()))
        .then("contact_form", contact_form)
}

/// Union of every contact pass over one page
pub fn extract_contact_details(html: &str) -> ContactDetails {
    let document = Html::parse_document(html);
    contact_chain().merge_all(&document)
}

/// Contacts found in the footer (emails, phones, address) and the header
/// (emails, phones), merged in that order
pub fn extract_landmark_contacts(html: &str) -> ContactDetails {
    let document = Html::parse_document(html);
    let mut details = ContactDetails::default();

    if let Some(footer) = Landmark::Footer.locate(&document) {
        details.merge(mailto_emails(footer));
        details.merge(tel_phones(footer));
        details.merge(text_contacts(footer));
        details.merge(address(footer));
    }
    if let Some(header) = Landmark::Header.locate(&document) {
        details.merge(mailto_emails(header));
        details.merge(tel_phones(header));
        details.merge(text_contacts(header));
    }
    details
}

fn mailto_emails(scope: ElementRef<'_>) -> ContactDetails {
    let mut details = ContactDetails::default();
    let Some(selector) = MAILTO_LINKS.as_ref() else {
        return details;
    };
    for link in scope.select(selector) {
        let Some(href) = attr(link, "href") else {
            continue;
        };
        let address = strip_scheme(href, "mailto:");
        let address = address.split('?').next().unwrap_or_default();
        details.add_email(address);
    }
    details
}

fn tel_phones(scope: ElementRef<'_>) -> ContactDetails {
    let mut details = ContactDetails::default();
    let Some(selector) = TEL_LINKS.as_ref() else {
        return details;
    };
    for link in scope.select(selector) {
        if let Some(href) = attr(link, "href") {
            details.add_phone(strip_scheme(href, "tel:"));
        }
    }
    details
}

fn strip_scheme<'a>(href: &'a str, scheme: &str) -> &'a str {
    href.get(scheme.len()..)
        .filter(|_| href[..scheme.len()].eq_ignore_ascii_case(scheme))
        .unwrap_or(href)
        .trim()
}

fn text_contacts(scope: ElementRef<'_>) -> ContactDetails {
    let text = joined_text(scope, "\n");
    let mut details = ContactDetails::default();
    for pattern in EMAIL_IN_TEXT.iter() {
        for found in pattern.find_iter(&text) {
            details.add_email(found.as_str());
        }
    }
    for pattern in PHONE_IN_TEXT.iter() {
        for found in pattern.find_iter(&text) {
            details.add_phone(found.as_str());
        }
    }
    details
}

fn address(scope: ElementRef<'_>) -> ContactDetails {
    let tagged = ADDRESS_TAG
        .as_ref()
        .and_then(|selector| scope.select(selector).next())
        .map(normalized_text)
        .filter(|text| char_len(text) > MIN_ADDRESS_CHARS);

    let address = tagged.or_else(|| {
        ADDRESS_CLASSES.iter().find_map(|selector| {
            scope
                .select(selector)
                .next()
                .map(normalized_text)
                .filter(|text| char_len(text) > MIN_ADDRESS_CHARS)
        })
    });

    ContactDetails {
        address,
        ..ContactDetails::default()
    }
}

fn social_links(scope: ElementRef<'_>) -> ContactDetails {
    let mut details = ContactDetails::default();
    let Some(anchors) = ANCHORS.as_ref() else {
        return details;
    };
    for anchor in scope.select(anchors) {
        let Some(href) = attr(anchor, "href") else {
            continue;
        };
        let lower = href.to_ascii_lowercase();
        if SOCIAL_LINK_DOMAINS.iter().any(|domain| lower.contains(domain)) {
            details.add_social_link(href);
        }
    }
    details
}

fn contact_form(document: &Html) -> ContactDetails {
    let present = FORMS.as_ref().is_some_and(|selector| {
        document.select(selector).any(|form| {
            let text = joined_text(form, " ").to_lowercase();
            let action = attr(form, "action").unwrap_or_default().to_ascii_lowercase();
            CONTACT_FORM_KEYWORDS
                .iter()
                .any(|keyword| text.contains(keyword))
                || action.contains("contact")
        })
    });
    ContactDetails {
        contact_form_present: present,
        ..ContactDetails::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTACT_PAGE: &str = r#"
        <html><body>
          <main>
            <h1>Contact us</h1>
            <p>Email <a href="mailto:hello@brand.com?subject=Hi">hello@brand.com</a>
               or write to HELLO@brand.com and press@brand.com.</p>
            <p>Call <a href="tel:+1-202-555-0173">+1 (202) 555-0173</a></p>
            <p>Order line: +1 202 555 0173</p>
            <address>12 Market Street, Portland, OR 97201</address>
            <a href="https://instagram.com/brandx">Instagram</a>
            <a href="https://www.facebook.com/brandx/">Facebook</a>
            <a href="https://example.com/blog">Blog</a>
            <form action="/contact"><label>Your message</label><button>Send</button></form>
          </main>
          <script>var fake = "script@brand.com";</script>
        </body></html>
    "#;

    #[test]
    fn test_contact_page_union() {
        let details = extract_contact_details(CONTACT_PAGE);

        assert_eq!(details.emails, vec!["hello@brand.com", "press@brand.com"]);
        assert_eq!(details.phones, vec!["12025550173"]);
        assert_eq!(
            details.address.as_deref(),
            Some("12 Market Street, Portland, OR 97201")
        );
        assert_eq!(
            details.social_links,
            vec!["https://instagram.com/brandx", "https://www.facebook.com/brandx/"]
        );
        assert!(details.contact_form_present);
    }

    #[test]
    fn test_invalid_candidates_are_dropped() {
        let details = extract_contact_details(
            r#"<html><body><a href="mailto:a@b">a@b</a><a href="tel:12345">12345</a></body></html>"#,
        );
        assert!(details.emails.is_empty());
        assert!(details.phones.is_empty());
        assert!(details.is_empty());
    }

    #[test]
    fn test_address_falls_back_to_class_selectors() {
        let details = extract_contact_details(
            r#"<html><body><div class="store-location">Unit 4, 99 Harbour Road, Leeds</div></body></html>"#,
        );
        assert_eq!(
            details.address.as_deref(),
            Some("Unit 4, 99 Harbour Road, Leeds")
        );
    }

    #[test]
    fn test_newsletter_form_is_not_contact_form() {
        let details = extract_contact_details(
            r#"<html><body><form action="/subscribe"><label>Join our newsletter</label></form></body></html>"#,
        );
        assert!(!details.contact_form_present);
    }

    #[test]
    fn test_landmark_contacts_merge_footer_then_header() {
        let details = extract_landmark_contacts(
            r#"
            <html><body>
              <header><a href="mailto:sales@brand.com">Sales</a><span>Call 020 7946 0958</span></header>
              <main><a href="mailto:ignored@brand.com">Not scanned</a></main>
              <footer>
                <p>support@brand.com</p>
                <address>1 Canal Street, Manchester M1 3HE</address>
              </footer>
            </body></html>
            "#,
        );

        assert_eq!(details.emails, vec!["support@brand.com", "sales@brand.com"]);
        assert_eq!(details.phones, vec!["02079460958"]);
        assert_eq!(
            details.address.as_deref(),
            Some("1 Canal Street, Manchester M1 3HE")
        );
    }
}
