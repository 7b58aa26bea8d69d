//! Insight record and its per-category value types
//!
//! Every field of [`InsightRecord`] is either a validated, non-trivial value or
//! the type's empty default. Collection types enforce their own caps and
//! deduplication so extractors cannot store partial fragments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::product::Product;
use crate::domain::value_objects::{EmailAddress, PhoneNumber, SocialHandle};

/// Aggregate result for one store, built once per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRecord {
    #[serde(rename = "website_url")]
    pub store_url: String,
    pub fetched_at: DateTime<Utc>,
    #[serde(rename = "product_catalog", default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub hero_products: Vec<HeroProduct>,
    #[serde(default)]
    pub privacy_policy: Option<String>,
    #[serde(rename = "return_refund_policy", default)]
    pub return_policy: Option<String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub social_handles: SocialHandles,
    #[serde(default)]
    pub contact_details: ContactDetails,
    #[serde(default)]
    pub brand_context: Option<String>,
    #[serde(default)]
    pub important_links: ImportantLinks,
    #[serde(default)]
    pub metadata: StoreMetadata,
    /// Catalog analysis from the enrichment stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_analysis: Option<serde_json::Value>,
    /// Social presence analysis from the enrichment stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_analysis: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights_summary: Option<String>,
}

impl InsightRecord {
    pub fn empty(store_url: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into(),
            fetched_at: Utc::now(),
            products: Vec::new(),
            hero_products: Vec::new(),
            privacy_policy: None,
            return_policy: None,
            faqs: Vec::new(),
            social_handles: SocialHandles::default(),
            contact_details: ContactDetails::default(),
            brand_context: None,
            important_links: ImportantLinks::default(),
            metadata: StoreMetadata::default(),
            product_analysis: None,
            social_analysis: None,
            insights_summary: None,
        }
    }

    /// Number of the nine heuristic categories that produced a value
    pub fn populated_categories(&self) -> usize {
        [
            !self.products.is_empty(),
            !self.hero_products.is_empty(),
            self.privacy_policy.is_some() || self.return_policy.is_some(),
            !self.faqs.is_empty(),
            !self.social_handles.is_empty(),
            !self.contact_details.is_empty(),
            self.brand_context.is_some(),
            !self.important_links.is_empty(),
            !self.metadata.is_empty(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }
}

/// Featured product scraped from homepage markup
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeroProduct {
    pub title: Option<String>,
    pub price: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

impl HeroProduct {
    /// A hero product needs at least a title or a link
    pub const fn is_acceptable(&self) -> bool {
        self.title.is_some() || self.url.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Privacy and return/refund policy texts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    pub privacy: Option<String>,
    pub return_refund: Option<String>,
}

impl PolicySet {
    pub const fn is_empty(&self) -> bool {
        self.privacy.is_none() && self.return_refund.is_none()
    }

    pub const fn is_complete(&self) -> bool {
        self.privacy.is_some() && self.return_refund.is_some()
    }
}

/// Contact points merged across every extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(rename = "phone_numbers", default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub social_links: Vec<String>,
    #[serde(rename = "contact_form", default)]
    pub contact_form_present: bool,
}

impl ContactDetails {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.phones.is_empty()
            && self.address.is_none()
            && self.social_links.is_empty()
            && !self.contact_form_present
    }

    /// Adds a validated email unless an equal one (ignoring case) is present
    pub fn add_email(&mut self, candidate: &str) -> bool {
        let Ok(email) = EmailAddress::parse(candidate) else {
            return false;
        };
        if self
            .emails
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(email.as_str()))
        {
            return false;
        }
        self.emails.push(email.into_inner());
        true
    }

    /// Adds a digit-normalized phone unless already present
    pub fn add_phone(&mut self, candidate: &str) -> bool {
        let Ok(phone) = PhoneNumber::parse(candidate) else {
            return false;
        };
        if self.phones.iter().any(|existing| existing == phone.digits()) {
            return false;
        }
        self.phones.push(phone.into_inner());
        true
    }

    pub fn add_social_link(&mut self, href: &str) -> bool {
        if self.social_links.iter().any(|existing| existing == href) {
            return false;
        }
        self.social_links.push(href.to_string());
        true
    }

    /// Union with another pass; the first address found is kept
    pub fn merge(&mut self, other: Self) {
        for email in &other.emails {
            self.add_email(email);
        }
        for phone in &other.phones {
            self.add_phone(phone);
        }
        if self.address.is_none() {
            self.address = other.address;
        }
        for link in &other.social_links {
            self.add_social_link(link);
        }
        self.contact_form_present |= other.contact_form_present;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Twitter,
    Youtube,
    Tiktok,
    Linkedin,
    Pinterest,
    Snapchat,
    Whatsapp,
}

impl SocialPlatform {
    pub const ALL: [Self; 9] = [
        Self::Instagram,
        Self::Facebook,
        Self::Twitter,
        Self::Youtube,
        Self::Tiktok,
        Self::Linkedin,
        Self::Pinterest,
        Self::Snapchat,
        Self::Whatsapp,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
            Self::Linkedin => "linkedin",
            Self::Pinterest => "pinterest",
            Self::Snapchat => "snapchat",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Domains whose presence in an href ties a link to this platform
    pub const fn domains(self) -> &'static [&'static str] {
        match self {
            Self::Instagram => &["instagram.com"],
            Self::Facebook => &["facebook.com", "fb.com"],
            Self::Twitter => &["twitter.com", "x.com"],
            Self::Youtube => &["youtube.com"],
            Self::Tiktok => &["tiktok.com"],
            Self::Linkedin => &["linkedin.com"],
            Self::Pinterest => &["pinterest.com"],
            Self::Snapchat => &["snapchat.com"],
            Self::Whatsapp => &["wa.me", "whatsapp.com"],
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One handle per platform; the first accepted handle is never overwritten
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocialHandles(BTreeMap<SocialPlatform, String>);

impl SocialHandles {
    pub fn get(&self, platform: SocialPlatform) -> Option<&str> {
        self.0.get(&platform).map(String::as_str)
    }

    pub fn contains(&self, platform: SocialPlatform) -> bool {
        self.0.contains_key(&platform)
    }

    /// Inserts a cleaned handle if the platform is unresolved
    pub fn insert_if_absent(&mut self, platform: SocialPlatform, raw: &str) -> bool {
        if self.contains(platform) {
            return false;
        }
        match SocialHandle::parse(raw) {
            Ok(handle) => {
                self.0.insert(platform, handle.into_inner());
                true
            }
            Err(_) => false,
        }
    }

    /// Merges a later pass: existing platforms win
    pub fn merge_first_wins(&mut self, later: Self) {
        for (platform, handle) in later.0 {
            self.0.entry(platform).or_insert(handle);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == SocialPlatform::ALL.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SocialPlatform, &str)> {
        self.0.iter().map(|(platform, handle)| (*platform, handle.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCategory {
    OrderTracking,
    ContactUs,
    Blog,
    About,
    Shipping,
    SizeGuide,
}

impl LinkCategory {
    pub const ALL: [Self; 6] = [
        Self::OrderTracking,
        Self::ContactUs,
        Self::Blog,
        Self::About,
        Self::Shipping,
        Self::SizeGuide,
    ];

    /// Ordered href keywords; the first anchor matching any of them wins
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::OrderTracking => &["track", "order", "tracking"],
            Self::ContactUs => &["contact", "contact-us"],
            Self::Blog => &["blog", "news", "articles"],
            Self::About => &["about", "about-us"],
            Self::Shipping => &["shipping", "delivery"],
            Self::SizeGuide => &["size", "size-guide", "sizing"],
        }
    }
}

pub type ImportantLinks = BTreeMap<LinkCategory, String>;

/// Homepage title, meta tags and first JSON-LD block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreMetadata {
    #[serde(default)]
    pub title: Option<String>,
    /// name/property -> content; a later duplicate overwrites an earlier one
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    #[serde(default)]
    pub structured_data: Option<serde_json::Value>,
}

impl StoreMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.meta.is_empty() && self.structured_data.is_none()
    }

    pub fn description(&self) -> Option<&str> {
        self.meta
            .get("description")
            .map(String::as_str)
            .filter(|content| !content.trim().is_empty())
    }
}
