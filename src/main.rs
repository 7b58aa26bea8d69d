//! Storefront Insights command line
//!
//! `serve` runs the HTTP API; `fetch <url>` prints one insight record as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use storefront_insights::api::{AppState, router};
use storefront_insights::application::{EnrichmentStage, InsightOrchestrator};
use storefront_insights::infrastructure::logging::log_system_info;
use storefront_insights::infrastructure::{AppConfig, HttpSessionFactory, init_logging_with_config};

#[derive(Parser)]
#[command(name = "storefront-insights")]
#[command(about = "Structured insight extraction from public storefront websites")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Overrides `server.bind_address`
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fetch insights for one store and print them as JSON
    Fetch {
        /// Store URL, e.g. https://shop.example.com
        url: String,

        /// Skip the language-model enrichment stage
        #[arg(long)]
        no_enrich: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env: {e}");
        }
    }

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging_with_config(&config.logging)?;
    log_system_info();

    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await,
        Commands::Fetch { url, no_enrich } => fetch(config, &url, no_enrich).await,
    }
}

fn build_orchestrator(config: &AppConfig, enrich: bool) -> InsightOrchestrator {
    let enrichment = if enrich {
        EnrichmentStage::from_config(&config.enrichment).unwrap_or_else(|e| {
            warn!(error = %e, "Enrichment disabled");
            None
        })
    } else {
        None
    };
    InsightOrchestrator::new(
        Arc::new(HttpSessionFactory::new(config.http.clone())),
        config.extraction.clone(),
    )
    .with_enrichment(enrichment)
}

async fn serve(config: AppConfig, bind: Option<String>) -> Result<()> {
    let orchestrator = build_orchestrator(&config, true);
    let state = AppState::new(orchestrator, &config.server.static_dir);
    let app = router(state, &config.server);

    let addr = bind.unwrap_or_else(|| config.server.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("🚀 Storefront Insights API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn fetch(config: AppConfig, url: &str, no_enrich: bool) -> Result<()> {
    let orchestrator = build_orchestrator(&config, !no_enrich);
    let record = orchestrator.fetch_insights(url).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
