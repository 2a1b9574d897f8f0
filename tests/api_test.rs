mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::*;
use property_search::api::{build_router, AppState};
use property_search::state::{InMemoryStore, PropertyStore};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app(store: Arc<InMemoryStore>, public_dir: &Path) -> Router {
    let search = Arc::new(service(store));
    build_router(AppState::new(search, public_dir))
}

fn public_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Property Search</h1>").unwrap();
    std::fs::write(dir.path().join("search.js"), "console.log('ok');").unwrap();
    dir
}

fn search_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/property/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_search_returns_ranked_json() {
    let dir = public_dir();
    let app = app(ready_store(&denver_catalog()).await, dir.path());

    let response = app
        .oneshot(search_request(json!({
            "type": "office", "zip": DENVER_ZIP, "radius": 5, "begin": 1000, "end": 5000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["key"], "property:2");
    assert_eq!(hits[0]["rate"], 150.5);
    assert_eq!(hits[0]["begin"], 900);
    assert_eq!(hits[0]["end"], 5000);
}

#[tokio::test]
async fn test_radius_as_string_is_accepted() {
    let dir = public_dir();
    let app = app(ready_store(&denver_catalog()).await, dir.path());

    let response = app
        .oneshot(search_request(json!({
            "type": "office", "zip": DENVER_ZIP, "radius": "5", "begin": 1000, "end": 5000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_zip_is_bad_request() {
    let dir = public_dir();
    let app = app(ready_store(&denver_catalog()).await, dir.path());

    let response = app
        .oneshot(search_request(json!({
            "type": "office", "zip": "00000", "radius": 5, "begin": 1000, "end": 5000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "ZIP_NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("00000"));
}

#[tokio::test]
async fn test_no_match_is_not_found() {
    let dir = public_dir();
    let app = app(ready_store(&denver_catalog()).await, dir.path());

    let response = app
        .oneshot(search_request(json!({
            "type": "office", "zip": DENVER_ZIP, "radius": 5, "begin": 20000, "end": 30000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "No properties found");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let dir = public_dir();
    let app = app(ready_store(&denver_catalog()).await, dir.path());

    let response = app
        .oneshot(search_request(json!({ "type": "office", "zip": DENVER_ZIP })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_search_before_load_is_unavailable() {
    let dir = public_dir();
    let app = app(empty_store().await, dir.path());

    let response = app
        .oneshot(search_request(json!({
            "type": "office", "zip": DENVER_ZIP, "radius": 5, "begin": 1000, "end": 5000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readiness_checked_before_body() {
    let dir = public_dir();
    let app = app(empty_store().await, dir.path());

    let response = app
        .oneshot(search_request(json!({ "type": "office" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "NOT_READY");
}

#[tokio::test]
async fn test_store_timeout_is_gateway_timeout() {
    let dir = public_dir();
    let search = Arc::new(faulty_service(AggregateFault::Stall(Duration::from_secs(5))).await);
    let app = build_router(AppState::new(search, dir.path()));

    let response = app
        .oneshot(search_request(json!({
            "type": "office", "zip": DENVER_ZIP, "radius": 5, "begin": 1000, "end": 5000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "TIMEOUT");
}

#[tokio::test]
async fn test_store_failure_is_bad_gateway() {
    let dir = public_dir();
    let search = Arc::new(faulty_service(AggregateFault::Fail).await);
    let app = build_router(AppState::new(search, dir.path()));

    let response = app
        .oneshot(search_request(json!({
            "type": "office", "zip": DENVER_ZIP, "radius": 5, "begin": 1000, "end": 5000
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["code"], "STORE_ERROR");
    assert!(body["error"].as_str().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_entry_page_gated_on_load() {
    let dir = public_dir();
    let store = empty_store().await;

    let response = app(store.clone(), dir.path()).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Data Load in Progress");

    let response = app(store.clone(), dir.path())
        .oneshot(get("/search.js"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    store.mark_load_complete().await.unwrap();

    let response = app(store.clone(), dir.path()).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Property Search"));

    let response = app(store, dir.path()).oneshot(get("/search.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoints() {
    let dir = public_dir();
    let store = empty_store().await;

    let response = app(store.clone(), dir.path())
        .oneshot(get("/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(store.clone(), dir.path())
        .oneshot(get("/health/ready"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "loading");

    store.mark_load_complete().await.unwrap();
    let response = app(store, dir.path()).oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
