//! HTTP service surface
//!
//! `POST /fetch-insights`, `GET /health`, `GET /` and static assets under
//! `/static`. Errors map to 404 / 401 / 500 with a `{"detail": ...}` body.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::application::{
    ErrorBody, ErrorCategory, FetchInsightsRequest, FetchInsightsResponse, InsightError,
    InsightOrchestrator,
};
use crate::infrastructure::config::ServerConfig;

/// Shared state for every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<InsightOrchestrator>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(orchestrator: InsightOrchestrator, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            static_dir: static_dir.into(),
        }
    }
}

/// Build the router with trace, CORS and request-timeout layers
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/fetch-insights", post(fetch_insights_handler))
        .nest_service("/static", static_files)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Caller-facing error with its HTTP status
#[derive(Debug)]
pub struct ApiError(InsightError);

impl From<InsightError> for ApiError {
    fn from(error: InsightError) -> Self {
        Self(error)
    }
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self.0.category() {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Insight request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "Insight request rejected");
        }
        (status, Json(ErrorBody::new(self.0.to_string()))).into_response()
    }
}

pub async fn fetch_insights_handler(
    State(state): State<AppState>,
    Json(request): Json<FetchInsightsRequest>,
) -> Result<Json<FetchInsightsResponse>, ApiError> {
    info!(url = %request.website_url, "Insight request received");
    let record = state
        .orchestrator
        .fetch_insights(&request.website_url)
        .await?;
    Ok(Json(FetchInsightsResponse::from(record)))
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "enrichment": state.orchestrator.enrichment_enabled(),
    }))
}

/// `static/index.html` when present, otherwise API info
pub async fn index_handler(State(state): State<AppState>) -> Response {
    let index = state.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            debug!(path = %index.display(), error = %e, "No index page, serving API info");
            Json(json!({
                "message": "Storefront Insights API",
                "version": env!("CARGO_PKG_VERSION"),
                "endpoints": {
                    "POST /fetch-insights": "Fetch insights for a storefront",
                    "GET /health": "Liveness check",
                },
            }))
            .into_response()
        }
    }
}
