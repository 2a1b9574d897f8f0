use property_search::{
    api::{build_router, AppState},
    config::Config,
    loader::{CsvDataSource, LoadOrchestrator},
    search::{IndexSchema, SearchService},
    state::create_store,
    telemetry::init_tracing,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config.observability);
    tracing::info!("Starting property search v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage backend; the only failure that stops the process
    tracing::info!("Storage backend: {:?}", config.store.backend);
    let store = create_store(&config.store).await?;
    tracing::info!("✅ Storage backend initialized");

    // Trigger the catalog load once, off the request path
    if store.is_load_complete().await? {
        tracing::info!("✅ Catalog already loaded");
    } else {
        let source = Arc::new(CsvDataSource::new(
            &config.loader.zip_csv_path,
            &config.loader.address_csv_path,
        ));
        let orchestrator = Arc::new(LoadOrchestrator::new(
            store.clone(),
            source,
            IndexSchema::property_index(&config.store.index_name),
            config.loader.clone(),
        ));
        // Outcome is logged by the task itself
        let _load = orchestrator.spawn();
        tracing::info!("⏳ Catalog load started in background");
    }

    let search = Arc::new(
        SearchService::new(store.clone(), &config.store.index_name)
            .with_query_timeout(Duration::from_millis(config.store.query_timeout_ms)),
    );

    let app_state = AppState::new(search, &config.server.public_dir)
        .with_request_timeout(Duration::from_secs(config.server.request_timeout_secs));
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 Server is up - http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health/ready", http_addr);
    tracing::info!("   Search API: http://{}/property/search", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
