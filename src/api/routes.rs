use crate::api::{handlers, AppState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main router
pub fn build_router(state: AppState) -> Router {
    // Entry page and static assets are only served once the catalog is loaded
    let site = Router::new()
        .route("/", get(handlers::index_page))
        .fallback_service(ServeDir::new(&state.public_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_ready,
        ));

    // Readiness is checked before the request body is extracted
    let api = Router::new()
        .route("/property/search", post(handlers::search_properties))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_loaded,
        ));

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check))
        .merge(api)
        .merge(site)
        // Add state
        .with_state(state.clone())
        // Add middleware
        .layer(TimeoutLayer::new(state.request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
