//! Insight orchestrator
//!
//! Opens one fetch session per store, checks the homepage, then fans out the
//! nine category tasks. Every task settles independently: an error, a panic or
//! a timeout turns into that field's empty default and never touches siblings.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use super::category_tasks::{
    fetch_brand_context, fetch_contact_details, fetch_faqs, fetch_hero_products,
    fetch_important_links, fetch_metadata, fetch_policies, fetch_products, fetch_social_handles,
};
use super::context::StoreContext;
use super::enrichment_stage::EnrichmentStage;
use super::error::{InsightError, InsightResult};
use crate::domain::{InsightRecord, PolicySet, StoreUrl};
use crate::infrastructure::config::ExtractionConfig;
use crate::infrastructure::{FetchError, PageFetcher, SessionFactory};

pub struct InsightOrchestrator {
    session_factory: Arc<dyn SessionFactory>,
    extraction: ExtractionConfig,
    enrichment: Option<EnrichmentStage>,
}

impl InsightOrchestrator {
    pub fn new(session_factory: Arc<dyn SessionFactory>, extraction: ExtractionConfig) -> Self {
        Self {
            session_factory,
            extraction,
            enrichment: None,
        }
    }

    #[must_use]
    pub fn with_enrichment(mut self, enrichment: Option<EnrichmentStage>) -> Self {
        self.enrichment = enrichment;
        self
    }

    pub const fn enrichment_enabled(&self) -> bool {
        self.enrichment.is_some()
    }

    /// Builds the insight record for one store
    pub async fn fetch_insights(&self, website_url: &str) -> InsightResult<InsightRecord> {
        let request_id = Uuid::new_v4();
        let span = info_span!("fetch_insights", %request_id, url = website_url);
        self.run(website_url).instrument(span).await
    }

    async fn run(&self, website_url: &str) -> InsightResult<InsightRecord> {
        let start = Instant::now();
        let base = StoreUrl::parse(website_url)?;
        let fetcher = self
            .session_factory
            .open()
            .map_err(|e| InsightError::Internal(e.to_string()))?;

        info!("🌐 Fetching insights for {}", base);
        let homepage = fetch_homepage(fetcher.as_ref(), &base).await?;
        let context = StoreContext::new(fetcher, base.clone(), homepage, self.extraction.clone());

        let mut record = self.gather(&context).await;
        info!(
            populated = record.populated_categories(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "✅ Insights assembled for {}",
            base
        );

        if let Some(enrichment) = &self.enrichment {
            record = enrichment.enrich(record, context.homepage()).await;
        }
        Ok(record)
    }

    /// Runs all category tasks concurrently and assembles the record
    async fn gather(&self, context: &StoreContext) -> InsightRecord {
        let timeout = Duration::from_secs(self.extraction.category_timeout_seconds);
        let ctx = || context.clone();

        let products = spawn_category("products", timeout, fetch_products(ctx()));
        let hero_products = spawn_category("hero_products", timeout, fetch_hero_products(ctx()));
        let policies = spawn_category("policies", timeout, fetch_policies(ctx()));
        let faqs = spawn_category("faqs", timeout, fetch_faqs(ctx()));
        let social_handles = spawn_category("social_handles", timeout, fetch_social_handles(ctx()));
        let contact_details = spawn_category("contact_details", timeout, fetch_contact_details(ctx()));
        let brand_context = spawn_category("brand_context", timeout, fetch_brand_context(ctx()));
        let important_links = spawn_category("important_links", timeout, fetch_important_links(ctx()));
        let metadata = spawn_category("metadata", timeout, fetch_metadata(ctx()));

        let (
            products,
            hero_products,
            policies,
            faqs,
            social_handles,
            contact_details,
            brand_context,
            important_links,
            metadata,
        ) = tokio::join!(
            settle("products", products),
            settle("hero_products", hero_products),
            settle::<PolicySet>("policies", policies),
            settle("faqs", faqs),
            settle("social_handles", social_handles),
            settle("contact_details", contact_details),
            settle("brand_context", brand_context),
            settle("important_links", important_links),
            settle("metadata", metadata),
        );

        InsightRecord {
            products,
            hero_products,
            privacy_policy: policies.privacy,
            return_policy: policies.return_refund,
            faqs,
            social_handles,
            contact_details,
            brand_context,
            important_links,
            metadata,
            ..InsightRecord::empty(context.base.as_str())
        }
    }
}

/// Homepage body when it answers 200. Unreachable or missing stores abort
/// the request; other statuses let extraction continue without a homepage.
async fn fetch_homepage(
    fetcher: &dyn PageFetcher,
    base: &StoreUrl,
) -> InsightResult<Option<String>> {
    let page = match fetcher.get(base.as_str()).await {
        Ok(page) => page,
        Err(FetchError::Session(message)) => return Err(InsightError::Internal(message)),
        Err(e) => {
            warn!(error = %e, "❌ Store homepage unreachable");
            return Err(InsightError::not_found(base.as_str(), e.to_string()));
        }
    };

    match page.status {
        200 => Ok(Some(page.body)),
        404 => Err(InsightError::not_found(base.as_str(), "homepage returned HTTP 404")),
        401 | 403 => Err(InsightError::Unauthorized {
            url: base.to_string(),
            status: page.status,
        }),
        status => {
            warn!(status, "Homepage returned an unexpected status, continuing without it");
            Ok(None)
        }
    }
}

fn spawn_category<T, F>(name: &'static str, timeout: Duration, task: F) -> CategoryTask<T>
where
    T: Send + 'static,
    F: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    CategoryTask(tokio::spawn(
        async move {
            match tokio::time::timeout(timeout, task).await {
                Ok(result) => result,
                Err(_) => Err(anyhow::anyhow!("timed out after {}s", timeout.as_secs())),
            }
        }
        .instrument(info_span!("category", name)),
    ))
}

/// Spawned category task, aborted when dropped so an abandoned request
/// stops fetching
struct CategoryTask<T>(JoinHandle<anyhow::Result<T>>);

impl<T> Drop for CategoryTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Result of one category task, or its empty default
async fn settle<T: Default>(name: &'static str, mut task: CategoryTask<T>) -> T {
    match (&mut task.0).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            warn!(category = name, error = %e, "Category failed, using empty default");
            T::default()
        }
        Err(e) => {
            error!(category = name, error = %e, "Category task aborted, using empty default");
            T::default()
        }
    }
}
