use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::{SearchRequest, SearchResultItem};
use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Body of the not-ready page response
pub const LOAD_IN_PROGRESS: &str = "Data Load in Progress";

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness endpoint: 200 once the catalog is loaded, 503 before
pub async fn readiness_check(State(state): State<AppState>) -> Result<Response> {
    let ready = state.store().is_load_complete().await?;
    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "loading")
    };

    Ok((
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
        .into_response())
}

/// Gate for the entry page and static assets
pub async fn require_ready(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match state.store().is_load_complete().await {
        Ok(true) => next.run(request).await,
        Ok(false) => (StatusCode::BAD_REQUEST, LOAD_IN_PROGRESS).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Gate for the search API; runs before the body is read
pub async fn require_loaded(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match state.store().is_load_complete().await {
        Ok(true) => next.run(request).await,
        Ok(false) => AppError::NotReady.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Static entry page
pub async fn index_page(State(state): State<AppState>) -> Result<Html<String>> {
    let page = tokio::fs::read_to_string(state.public_dir.join("index.html")).await?;
    Ok(Html(page))
}

/// Search for available properties
pub async fn search_properties(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Vec<SearchResultItem>>> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    tracing::info!(
        property_type = %request.property_type,
        zip = %request.zip,
        radius = request.radius,
        begin = request.begin,
        end = request.end,
        "POST /property/search"
    );

    let properties = state.search.search(&request).await?;
    tracing::info!(found = properties.len(), "Properties found");

    Ok(Json(properties))
}
