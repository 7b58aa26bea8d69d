//! Optional language-model overlay on an assembled insight record
//!
//! Every pass is independent. A pass that fails, or replies with something
//! other than the structure it asked for, leaves its field untouched.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::domain::{ContactDetails, Faq, InsightRecord, SocialHandles, SocialPlatform};
use crate::infrastructure::config::EnrichmentConfig;
use crate::infrastructure::config::defaults::{MAX_FAQS, MIN_POLICY_CHARS};
use crate::infrastructure::{
    ChatCompletionsClient, EnrichmentClient, EnrichmentError, EnrichmentResult,
};

const FAQ_INSTRUCTIONS: &str = "You structure FAQ data scraped from an online store. \
    Clean up the questions and answers so they are clear and complete. Reply with a JSON \
    array of objects with \"question\" and \"answer\" fields and nothing else.";

const BRAND_INSTRUCTIONS: &str = "You describe a brand from its homepage markup and metadata. \
    Cover what it sells, its values and mission, its target audience and its key selling \
    points in one paragraph of at most 300 words.";

const PRODUCT_INSTRUCTIONS: &str = "You analyse a product catalog sample from an online store. \
    Reply with a JSON object with \"categories\" (category name to product count), \
    \"price_range\" and \"analysis\" (key insights) and nothing else.";

const SOCIAL_INSTRUCTIONS: &str = "You analyse an online store's social media presence. \
    Reply with a JSON object with \"analysis\" (string) and \"recommendations\" (array of \
    strings) and nothing else.";

const SUMMARY_INSTRUCTIONS: &str = "You write a professional summary of storefront insights \
    covering a store overview, key metrics, data completeness and notable findings, in at \
    most 200 words.";

const CLEAN_INSTRUCTIONS: &str = "You validate and clean storefront insight data. Remove \
    duplicate or invalid entries, fix email and phone formats and clean up social media \
    handles. Reply with the cleaned JSON object only.";

/// Minimum address length accepted from a cleaned reply
const MIN_ADDRESS_CHARS: usize = 10;

#[derive(Clone)]
pub struct EnrichmentStage {
    client: Arc<dyn EnrichmentClient>,
    config: EnrichmentConfig,
}

impl EnrichmentStage {
    pub fn new(client: Arc<dyn EnrichmentClient>, config: EnrichmentConfig) -> Self {
        Self { client, config }
    }

    /// `None` when enrichment is disabled or no API key is configured
    pub fn from_config(config: &EnrichmentConfig) -> EnrichmentResult<Option<Self>> {
        Ok(ChatCompletionsClient::from_config(config)?.map(|client| {
            info!("🤖 Enrichment enabled with model {}", client.model());
            Self::new(Arc::new(client), config.clone())
        }))
    }

    /// Overlays enrichment results; failed passes keep the heuristic values
    pub async fn enrich(&self, mut record: InsightRecord, homepage: Option<&str>) -> InsightRecord {
        let (faqs, brand_context, product_analysis, social_analysis, summary) = futures::join!(
            self.structure_faqs(&record.faqs),
            self.describe_brand(homepage, &record),
            self.analyse_products(&record),
            self.analyse_social(&record.social_handles),
            self.summarise(&record),
        );

        apply("faqs", faqs, |faqs| record.faqs = faqs);
        apply("brand_context", brand_context, |text| {
            record.brand_context = Some(text);
        });
        apply("product_analysis", product_analysis, |analysis| {
            record.product_analysis = Some(analysis);
        });
        apply("social_analysis", social_analysis, |analysis| {
            record.social_analysis = Some(analysis);
        });
        apply("insights_summary", summary, |text| {
            record.insights_summary = Some(text);
        });

        match self.validate_and_clean(&record).await {
            Ok(cleaned) => apply_cleaned(&mut record, &cleaned),
            Err(e) => warn!(
                pass = "validate_and_clean",
                error = %e,
                "Enrichment pass failed, keeping heuristic value"
            ),
        }
        record
    }

    async fn structure_faqs(&self, faqs: &[Faq]) -> EnrichmentResult<Vec<Faq>> {
        if faqs.is_empty() {
            return Err(skipped("no FAQs"));
        }
        let payload = to_payload(&faqs)?;
        let reply = self.client.send(&payload, FAQ_INSTRUCTIONS).await?;
        let structured: Vec<Faq> = parse_structured(&reply, '[')?;
        let mut cleaned = valid_faqs(structured);
        if cleaned.is_empty() {
            return Err(EnrichmentError::Parse("empty FAQ list".into()));
        }
        cleaned.truncate(MAX_FAQS);
        Ok(cleaned)
    }

    async fn describe_brand(
        &self,
        homepage: Option<&str>,
        record: &InsightRecord,
    ) -> EnrichmentResult<String> {
        if homepage.is_none() && record.metadata.is_empty() {
            return Err(skipped("no homepage or metadata"));
        }
        let excerpt = truncate_at_char_boundary(
            homepage.unwrap_or_default(),
            self.config.homepage_excerpt_chars,
        );
        let payload = to_payload(&json!({
            "homepage_excerpt": excerpt,
            "metadata": record.metadata,
        }))?;
        let reply = self.client.send(&payload, BRAND_INSTRUCTIONS).await?;
        non_empty_text(&reply)
    }

    async fn analyse_products(&self, record: &InsightRecord) -> EnrichmentResult<Value> {
        if record.products.is_empty() {
            return Err(skipped("no products"));
        }
        let sample = &record.products[..record.products.len().min(self.config.product_sample_size)];
        let payload = to_payload(&sample)?;
        let reply = self.client.send(&payload, PRODUCT_INSTRUCTIONS).await?;
        non_empty_object(parse_structured(&reply, '{')?)
    }

    async fn analyse_social(&self, handles: &SocialHandles) -> EnrichmentResult<Value> {
        if handles.is_empty() {
            return Err(skipped("no social handles"));
        }
        let payload = to_payload(handles)?;
        let reply = self.client.send(&payload, SOCIAL_INSTRUCTIONS).await?;
        non_empty_object(parse_structured(&reply, '{')?)
    }

    async fn summarise(&self, record: &InsightRecord) -> EnrichmentResult<String> {
        let payload = to_payload(&json!({
            "store_url": record.store_url,
            "total_products": record.products.len(),
            "hero_products": record.hero_products.len(),
            "faqs_count": record.faqs.len(),
            "social_platforms": record.social_handles.len(),
            "has_policies": record.privacy_policy.is_some() || record.return_policy.is_some(),
            "contact_info": !record.contact_details.is_empty(),
            "brand_context": record.brand_context.is_some(),
        }))?;
        let reply = self.client.send(&payload, SUMMARY_INSTRUCTIONS).await?;
        non_empty_text(&reply)
    }

    async fn validate_and_clean(&self, record: &InsightRecord) -> EnrichmentResult<Value> {
        let payload = to_payload(record)?;
        let reply = self.client.send(&payload, CLEAN_INSTRUCTIONS).await?;
        non_empty_object(parse_structured(&reply, '{')?)
    }
}

fn skipped(reason: &str) -> EnrichmentError {
    EnrichmentError::Config(format!("skipped: {reason}"))
}

fn apply<T>(pass: &str, result: EnrichmentResult<T>, update: impl FnOnce(T)) {
    match result {
        Ok(value) => {
            debug!(pass, "Enrichment pass applied");
            update(value);
        }
        Err(EnrichmentError::Config(reason)) => debug!(pass, reason = %reason, "Enrichment pass not run"),
        Err(e) => warn!(pass, error = %e, "Enrichment pass failed, keeping heuristic value"),
    }
}

fn to_payload<T: serde::Serialize + ?Sized>(value: &T) -> EnrichmentResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| EnrichmentError::Parse(e.to_string()))
}

fn non_empty_text(reply: &str) -> EnrichmentResult<String> {
    let text = reply.trim();
    if text.is_empty() {
        Err(EnrichmentError::Parse("empty reply".into()))
    } else {
        Ok(text.to_string())
    }
}

fn non_empty_object(value: Value) -> EnrichmentResult<Value> {
    match value {
        Value::Object(ref map) if !map.is_empty() => Ok(value),
        Value::Object(_) => Err(EnrichmentError::Parse("empty object".into())),
        other => Err(EnrichmentError::Parse(format!(
            "expected an object, got {}",
            json_kind(&other)
        ))),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn valid_faqs(faqs: Vec<Faq>) -> Vec<Faq> {
    let mut cleaned: Vec<Faq> = Vec::new();
    for faq in faqs {
        let faq = Faq::new(faq.question.trim(), faq.answer.trim());
        if !faq.question.is_empty() && !faq.answer.is_empty() && !cleaned.contains(&faq) {
            cleaned.push(faq);
        }
    }
    cleaned
}

/// Parses a structured reply. Code fences are stripped first; if the reply
/// still does not parse, the first balanced payload opened by `open` is tried
/// once.
pub fn parse_structured<T: DeserializeOwned>(reply: &str, open: char) -> EnrichmentResult<T> {
    let text = strip_code_fences(reply);
    if let Ok(parsed) = serde_json::from_str(text) {
        return Ok(parsed);
    }
    let payload = balanced_payload(text, open)
        .ok_or_else(|| EnrichmentError::Parse(format!("no '{open}' payload in reply")))?;
    serde_json::from_str(payload).map_err(|e| EnrichmentError::Parse(e.to_string()))
}

fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// First `open`..matching-close span, skipping brackets inside JSON strings
fn balanced_payload(text: &str, open: char) -> Option<&str> {
    let close = match open {
        '[' => ']',
        '{' => '}',
        _ => return None,
    };
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Longest prefix of at most `max_bytes` that ends on a char boundary
pub fn truncate_at_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Applies a validate/clean reply field by field. A cleaned field replaces
/// the current one only when it is non-empty and still valid.
fn apply_cleaned(record: &mut InsightRecord, cleaned: &Value) {
    let field = |name: &str| cleaned.get(name).cloned();

    if let Some(faqs) = field("faqs").and_then(|value| serde_json::from_value::<Vec<Faq>>(value).ok()) {
        let mut faqs = valid_faqs(faqs);
        faqs.truncate(MAX_FAQS);
        if !faqs.is_empty() {
            record.faqs = faqs;
        }
    }

    if let Some(contact) = field("contact_details")
        .and_then(|value| serde_json::from_value::<ContactDetails>(value).ok())
    {
        apply_cleaned_contact(&mut record.contact_details, &contact);
    }

    if let Some(Value::Object(handles)) = field("social_handles") {
        let mut rebuilt = SocialHandles::default();
        for (platform, handle) in handles {
            let platform = serde_json::from_value::<SocialPlatform>(Value::String(platform));
            if let (Ok(platform), Value::String(handle)) = (platform, handle) {
                rebuilt.insert_if_absent(platform, &handle);
            }
        }
        if !rebuilt.is_empty() {
            record.social_handles = rebuilt;
        }
    }

    let policy = |name: &str| {
        field(name)
            .and_then(|value| value.as_str().map(str::trim).map(str::to_string))
            .filter(|text| text.chars().count() > MIN_POLICY_CHARS)
    };
    if let Some(privacy) = policy("privacy_policy") {
        record.privacy_policy = Some(privacy);
    }
    if let Some(return_policy) = policy("return_refund_policy") {
        record.return_policy = Some(return_policy);
    }

    if let Some(brand) = field("brand_context")
        .and_then(|value| value.as_str().map(str::trim).map(str::to_string))
        .filter(|text| !text.is_empty())
    {
        record.brand_context = Some(brand);
    }
}

/// Replaces each contact sub-field only with cleaned entries that pass
/// validation; sub-fields the reply leaves empty or invalid keep their value
fn apply_cleaned_contact(current: &mut ContactDetails, cleaned: &ContactDetails) {
    let mut valid = ContactDetails::default();
    for email in &cleaned.emails {
        valid.add_email(email);
    }
    for phone in &cleaned.phones {
        valid.add_phone(phone);
    }
    for link in &cleaned.social_links {
        valid.add_social_link(link.trim());
    }

    if !valid.emails.is_empty() {
        current.emails = valid.emails;
    }
    if !valid.phones.is_empty() {
        current.phones = valid.phones;
    }
    if !valid.social_links.is_empty() {
        current.social_links = valid.social_links;
    }
    if let Some(address) = cleaned
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| address.chars().count() > MIN_ADDRESS_CHARS)
    {
        current.address = Some(address.to_string());
    }
    current.contact_form_present |= cleaned.contact_form_present;
}
