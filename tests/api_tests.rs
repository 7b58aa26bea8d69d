//! Router tests driven through `tower::ServiceExt::oneshot`
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use storefront_insights::api::{AppState, router};
use storefront_insights::application::InsightOrchestrator;
use storefront_insights::infrastructure::config::{ExtractionConfig, ServerConfig};
use storefront_insights::testing::{MockFetcher, MockSessionFactory};

const HOMEPAGE: &str = r#"<html><head><title>Brand X</title></head><body><p>Hello</p></body></html>"#;

fn app(fetcher: MockFetcher, static_dir: &std::path::Path) -> Router {
    let orchestrator = InsightOrchestrator::new(
        Arc::new(MockSessionFactory::new(Arc::new(fetcher))),
        ExtractionConfig::default(),
    );
    router(
        AppState::new(orchestrator, static_dir),
        &ServerConfig::default(),
    )
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn fetch_insights_returns_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(
        MockFetcher::new().with_page("https://shop.example.com", HOMEPAGE),
        dir.path(),
    );

    let response = app
        .oneshot(post_json(
            "/fetch-insights",
            &json!({"website_url": "https://shop.example.com"}),
        ))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["website_url"], "https://shop.example.com");
    assert_eq!(body["data"]["metadata"]["title"], "Brand X");
    assert!(body["data"]["faqs"].as_array().is_some_and(Vec::is_empty));
}

#[tokio::test]
async fn unknown_store_maps_to_404_detail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(MockFetcher::new(), dir.path());

    let response = app
        .oneshot(post_json(
            "/fetch-insights",
            &json!({"website_url": "https://missing.example.com"}),
        ))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(
        body["detail"]
            .as_str()
            .is_some_and(|detail| detail.contains("missing.example.com"))
    );
}

#[tokio::test]
async fn forbidden_store_maps_to_401() {
    let dir = tempfile::tempdir().expect("tempdir");
    let app = app(
        MockFetcher::new().with_status("https://locked.example.com", 403, "Forbidden"),
        dir.path(),
    );

    let response = app
        .oneshot(post_json(
            "/fetch-insights",
            &json!({"website_url": "https://locked.example.com"}),
        ))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_healthy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let response = app(MockFetcher::new(), dir.path())
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["enrichment"], false);
}

#[tokio::test]
async fn index_serves_static_page_when_present() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("index.html"), "<h1>Insights</h1>").expect("write index");

    let response = app(MockFetcher::new(), dir.path())
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request builds"))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    assert_eq!(&bytes[..], b"<h1>Insights</h1>");
}

#[tokio::test]
async fn index_falls_back_to_api_info() {
    let dir = tempfile::tempdir().expect("tempdir");
    let response = app(MockFetcher::new(), dir.path())
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request builds"))
        .await
        .expect("handled");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Storefront Insights API");
}
