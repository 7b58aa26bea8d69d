//! End-to-end extraction against an in-memory storefront
use std::sync::Arc;

use storefront_insights::application::{EnrichmentStage, ErrorCategory, InsightOrchestrator};
use storefront_insights::domain::{LinkCategory, SocialPlatform};
use storefront_insights::infrastructure::config::{EnrichmentConfig, ExtractionConfig};
use storefront_insights::testing::{MockEnrichmentClient, MockFetcher, MockSessionFactory};

const BASE: &str = "https://shop.brandx.com";

const HOMEPAGE: &str = r#"
<html>
  <head>
    <title>Brand X | Handmade Ceramics</title>
    <meta name="description" content="Handmade ceramics from a small studio in Lisbon.">
  </head>
  <body>
    <header>
      <nav>
        <a href="/pages/about-us">About</a>
        <a href="/pages/get-in-touch-contact">Contact</a>
      </nav>
    </header>
    <main>
      <h1>Welcome to Brand X</h1>
    </main>
    <footer>
      <a href="/pages/common-faq-answers">FAQ</a>
      <a href="https://instagram.com/brandx">Instagram</a>
      <a href="https://www.instagram.com/brandx_archive">Old Instagram</a>
      <p>Write to hello@brandx.com or HELLO@brandx.com</p>
    </footer>
  </body>
</html>
"#;

const FAQ_PAGE: &str = r#"
<html><body>
  <div class="faq-list">
    <div class="faq-item">
      <button class="faq-question">Do you ship internationally?</button>
      <div class="faq-answer"><p>Yes, we ship to over 40 countries worldwide.</p></div>
    </div>
    <div class="faq-item">
      <button class="faq-question">Are your glazes food safe?</button>
      <div class="faq-answer"><p>All of our glazes are lead free and food safe.</p></div>
    </div>
    <div class="faq-item">
      <button class="faq-question">Can I return a broken item?</button>
      <div class="faq-answer"><p>Send us a photo within 7 days and we will replace it.</p></div>
    </div>
  </div>
</body></html>
"#;

const CONTACT_PAGE: &str = r#"
<html><body>
  <a href="mailto:hello@brandx.com">Email us</a>
  <p>Call the studio on +44 20 7946 0958</p>
</body></html>
"#;

fn storefront() -> MockFetcher {
    MockFetcher::new()
        .with_page(BASE, HOMEPAGE)
        .with_status("https://shop.brandx.com/products.json", 500, "Internal Server Error")
        .with_page("https://shop.brandx.com/pages/common-faq-answers", FAQ_PAGE)
        .with_page("https://shop.brandx.com/pages/get-in-touch-contact", CONTACT_PAGE)
}

fn orchestrator(fetcher: MockFetcher) -> InsightOrchestrator {
    InsightOrchestrator::new(
        Arc::new(MockSessionFactory::new(Arc::new(fetcher))),
        ExtractionConfig::default(),
    )
}

#[tokio::test]
async fn faq_page_discovered_through_footer_link() {
    let record = orchestrator(storefront())
        .fetch_insights(BASE)
        .await
        .expect("store reachable");

    let questions: Vec<&str> = record.faqs.iter().map(|faq| faq.question.as_str()).collect();
    assert_eq!(
        questions,
        vec![
            "Do you ship internationally?",
            "Are your glazes food safe?",
            "Can I return a broken item?",
        ]
    );
}

#[tokio::test]
async fn failed_product_feed_leaves_other_categories_populated() {
    let record = orchestrator(storefront())
        .fetch_insights(BASE)
        .await
        .expect("store reachable");

    assert!(record.products.is_empty());
    assert_eq!(record.faqs.len(), 3);
    assert_eq!(record.metadata.title.as_deref(), Some("Brand X | Handmade Ceramics"));
    assert_eq!(
        record.brand_context.as_deref(),
        Some("Handmade ceramics from a small studio in Lisbon.")
    );
    assert_eq!(
        record.important_links.get(&LinkCategory::About).map(String::as_str),
        Some("https://shop.brandx.com/pages/about-us")
    );
    assert_eq!(
        record.important_links.get(&LinkCategory::ContactUs).map(String::as_str),
        Some("https://shop.brandx.com/pages/get-in-touch-contact")
    );
    assert!(!record.contact_details.is_empty());
    assert!(!record.social_handles.is_empty());
}

#[tokio::test]
async fn missing_policies_stay_absent() {
    let record = orchestrator(storefront())
        .fetch_insights(BASE)
        .await
        .expect("store reachable");

    assert_eq!(record.privacy_policy, None);
    assert_eq!(record.return_policy, None);
}

#[tokio::test]
async fn contact_details_are_deduplicated_across_sources() {
    let record = orchestrator(storefront())
        .fetch_insights(BASE)
        .await
        .expect("store reachable");

    assert_eq!(record.contact_details.emails, vec!["hello@brandx.com"]);
    assert_eq!(record.contact_details.phones, vec!["442079460958"]);
}

#[tokio::test]
async fn first_social_handle_wins() {
    let record = orchestrator(storefront())
        .fetch_insights(BASE)
        .await
        .expect("store reachable");

    assert_eq!(
        record.social_handles.get(SocialPlatform::Instagram),
        Some("brandx")
    );
}

#[tokio::test]
async fn extraction_is_idempotent() {
    let orchestrator = orchestrator(storefront());
    let first = orchestrator.fetch_insights(BASE).await.expect("first run");
    let mut second = orchestrator.fetch_insights(BASE).await.expect("second run");
    second.fetched_at = first.fetched_at;

    assert_eq!(first, second);
}

#[tokio::test]
async fn unreachable_store_is_not_found() {
    let err = orchestrator(MockFetcher::new().with_transport_error(BASE))
        .fetch_insights(BASE)
        .await
        .expect_err("unreachable");

    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[tokio::test]
async fn enrichment_overlays_summary_and_keeps_failed_fields() {
    let client = MockEnrichmentClient::new()
        .reply_when("professional summary", "Brand X sells handmade ceramics.");
    let stage = EnrichmentStage::new(Arc::new(client), EnrichmentConfig::default());

    let record = orchestrator(storefront())
        .with_enrichment(Some(stage))
        .fetch_insights(BASE)
        .await
        .expect("store reachable");

    assert_eq!(
        record.insights_summary.as_deref(),
        Some("Brand X sells handmade ceramics.")
    );
    assert_eq!(record.faqs.len(), 3);
    assert_eq!(
        record.brand_context.as_deref(),
        Some("Handmade ceramics from a small studio in Lisbon.")
    );
}
