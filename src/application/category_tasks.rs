//! One async task per insight category
//!
//! Each task composes probe, strategy chain, landmark fallback and homepage
//! pass for its category. Errors are returned to the orchestrator, which
//! settles them to the field's empty default.

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use super::context::StoreContext;
use super::fallback::FallbackLinkResolver;
use super::probe::CandidateUrlProbe;
use crate::domain::{
    ContactDetails, Faq, HeroProduct, ImportantLinks, PolicySet, Product, SocialHandles,
    StoreMetadata,
};
use crate::infrastructure::config::paths;
use crate::infrastructure::parsing::{
    CONTACT_LINKS, FAQ_LINKS, LinkPlan, PRIVACY_LINKS, RETURN_LINKS, extract_brand_context,
    extract_contact_details, extract_faqs, extract_hero_products, extract_important_links,
    extract_landmark_contacts, extract_metadata, extract_policy, extract_social_handles,
    parse_product_feed,
};

pub async fn fetch_products(context: StoreContext) -> Result<Vec<Product>> {
    let url = context
        .url_for(&context.config.product_feed_path)
        .context("Product feed path does not resolve against the store URL")?;
    let page = context.fetcher.get(&url).await?;
    if !page.is_ok() {
        bail!("Product feed returned HTTP {}", page.status);
    }
    let products = parse_product_feed(&page.body)?;
    info!("📦 Product feed mapped {} products", products.len());
    Ok(products)
}

pub async fn fetch_hero_products(context: StoreContext) -> Result<Vec<HeroProduct>> {
    Ok(context
        .homepage()
        .map(|homepage| extract_hero_products(homepage, &context.base))
        .unwrap_or_default())
}

pub async fn fetch_policies(context: StoreContext) -> Result<PolicySet> {
    let privacy = resolve_policy(&context, "privacy_policy", paths::PRIVACY_POLICY, &PRIVACY_LINKS);
    let return_refund = resolve_policy(&context, "return_policy", paths::RETURN_POLICY, &RETURN_LINKS);
    let (privacy, return_refund) = futures::join!(privacy, return_refund);
    Ok(PolicySet {
        privacy,
        return_refund,
    })
}

async fn resolve_policy(
    context: &StoreContext,
    category: &'static str,
    candidates: &[&str],
    plan: &LinkPlan,
) -> Option<String> {
    let policy = CandidateUrlProbe::new(context, category)
        .first_match(candidates, extract_policy)
        .await;
    if policy.is_some() || !context.config.fallback_discovery {
        return policy;
    }
    debug!(category, "Probing found nothing, trying landmark links");
    FallbackLinkResolver::new(context)
        .first_success(plan, extract_policy)
        .await
}

pub async fn fetch_faqs(context: StoreContext) -> Result<Vec<Faq>> {
    let faqs = CandidateUrlProbe::new(&context, "faq")
        .first_match(paths::FAQ, extract_faqs)
        .await;
    if !faqs.is_empty() || !context.config.fallback_discovery {
        return Ok(faqs);
    }

    let resolver = FallbackLinkResolver::new(&context);
    let faqs = resolver.first_success(&FAQ_LINKS, extract_faqs).await;
    if !faqs.is_empty() {
        return Ok(faqs);
    }
    debug!("No FAQ page found, scanning the homepage");
    Ok(resolver.homepage_pass(extract_faqs))
}

pub async fn fetch_social_handles(context: StoreContext) -> Result<SocialHandles> {
    Ok(context
        .homepage()
        .map(extract_social_handles)
        .unwrap_or_default())
}

pub async fn fetch_contact_details(context: StoreContext) -> Result<ContactDetails> {
    let contact = CandidateUrlProbe::new(&context, "contact")
        .first_match(paths::CONTACT, extract_contact_details)
        .await;
    if !contact.is_empty() || !context.config.fallback_discovery {
        return Ok(contact);
    }

    let resolver = FallbackLinkResolver::new(&context);
    let seed = resolver.homepage_pass(extract_landmark_contacts);
    let contact = resolver
        .merge_all(&CONTACT_LINKS, seed, extract_contact_details)
        .await;
    if !contact.is_empty() {
        return Ok(contact);
    }
    debug!("No contact page found, scanning the homepage");
    Ok(resolver.homepage_pass(extract_contact_details))
}

pub async fn fetch_brand_context(context: StoreContext) -> Result<Option<String>> {
    Ok(context.homepage().and_then(extract_brand_context))
}

pub async fn fetch_important_links(context: StoreContext) -> Result<ImportantLinks> {
    Ok(context
        .homepage()
        .map(|homepage| extract_important_links(homepage, &context.base))
        .unwrap_or_default())
}

pub async fn fetch_metadata(context: StoreContext) -> Result<StoreMetadata> {
    Ok(context.homepage().map(extract_metadata).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StoreUrl;
    use crate::infrastructure::config::ExtractionConfig;
    use crate::testing::MockFetcher;
    use std::sync::Arc;

    const BASE: &str = "https://shop.example.com";

    fn context(fetcher: MockFetcher, homepage: Option<&str>) -> StoreContext {
        StoreContext::new(
            Arc::new(fetcher),
            StoreUrl::parse(BASE).expect("valid"),
            homepage.map(str::to_string),
            ExtractionConfig::default(),
        )
    }

    fn policy_page(topic: &str) -> String {
        format!(
            "<html><body><main><h1>{topic}</h1><p>{}</p></main></body></html>",
            "This policy explains in detail how we handle every request you send us. ".repeat(4)
        )
    }

    #[tokio::test]
    async fn test_products_fail_on_non_200() {
        let ctx = context(
            MockFetcher::new().with_status("https://shop.example.com/products.json", 500, "oops"),
            None,
        );
        let err = fetch_products(ctx).await.expect_err("500 is a failure");
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_products_mapped() {
        let ctx = context(
            MockFetcher::new().with_page(
                "https://shop.example.com/products.json",
                r#"{"products": [{"id": 7, "title": "Mug", "handle": "mug"}]}"#,
            ),
            None,
        );
        let products = fetch_products(ctx).await.expect("feed parsed");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Mug");
    }

    #[tokio::test]
    async fn test_policies_probe_then_footer() {
        let homepage = r#"<html><body><footer><a href="/policies/refund-terms">Refunds</a></footer></body></html>"#;
        let ctx = context(
            MockFetcher::new()
                .with_page("https://shop.example.com/pages/privacy", policy_page("Privacy"))
                .with_page(
                    "https://shop.example.com/policies/refund-terms",
                    policy_page("Refunds"),
                ),
            Some(homepage),
        );

        let policies = fetch_policies(ctx).await.expect("infallible");
        assert!(policies.is_complete());
        assert!(
            policies
                .privacy
                .as_deref()
                .is_some_and(|text| text.starts_with("Privacy"))
        );
        assert!(
            policies
                .return_refund
                .as_deref()
                .is_some_and(|text| text.starts_with("Refunds"))
        );
    }

    #[tokio::test]
    async fn test_no_policy_pages_and_no_links() {
        let ctx = context(MockFetcher::new(), Some("<html><body><p>Welcome</p></body></html>"));
        let policies = fetch_policies(ctx).await.expect("infallible");
        assert!(policies.is_empty());
    }

    #[tokio::test]
    async fn test_faq_homepage_pass() {
        let homepage = r#"<html><body>
            <h2>Do you offer gift cards?</h2><p>Yes, digital gift cards are available.</p>
        </body></html>"#;
        let ctx = context(MockFetcher::new(), Some(homepage));
        let faqs = fetch_faqs(ctx).await.expect("infallible");
        assert_eq!(faqs, vec![Faq::new(
            "Do you offer gift cards?",
            "Yes, digital gift cards are available."
        )]);
    }

    #[tokio::test]
    async fn test_contact_fallback_merges_landmarks_and_links() {
        let homepage = r#"<html><body>
            <header><a href="/pages/get-in-touch-contact">Contact</a></header>
            <footer><p>hello@shop.example.com</p></footer>
        </body></html>"#;
        let ctx = context(
            MockFetcher::new().with_page(
                "https://shop.example.com/pages/get-in-touch-contact",
                r#"<p>Call us on +44 20 7946 0958</p>"#,
            ),
            Some(homepage),
        );

        let contact = fetch_contact_details(ctx).await.expect("infallible");
        assert_eq!(contact.emails, vec!["hello@shop.example.com"]);
        assert_eq!(contact.phones, vec!["442079460958"]);
    }

    #[tokio::test]
    async fn test_homepage_categories_without_homepage_are_empty() {
        let ctx = context(MockFetcher::new(), None);
        assert!(fetch_hero_products(ctx.clone()).await.expect("ok").is_empty());
        assert!(fetch_social_handles(ctx.clone()).await.expect("ok").is_empty());
        assert!(fetch_brand_context(ctx.clone()).await.expect("ok").is_none());
        assert!(fetch_important_links(ctx.clone()).await.expect("ok").is_empty());
        assert!(fetch_metadata(ctx).await.expect("ok").is_empty());
    }
}
