use axum::middleware;
use footfall::api::{self, app_state::AppState};
use footfall::config::loader::ConfigLoader;
use footfall::observability::{
    ObservabilityState, create_observability_router, init_tracing, metrics_middleware,
};
use footfall::services::{Dashboard, QueryService, create_query_service};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load_validated()?;

    let _log_guard = init_tracing(&config.logging);
    info!("Starting Footfall ({})...", config.environment);
    info!("Configuration loaded successfully");

    let dashboard = Arc::new(Dashboard::from_path(&config.dataset.path, &config.cache));
    let query_service: Arc<dyn QueryService> = Arc::from(create_query_service(dashboard));
    info!("Query service initialized over {}", config.dataset.path.display());

    // 预热：启动时加载一次，数据文件缺失或损坏不阻止启动
    match query_service.status().await {
        Ok(status) if status.source_present => info!(
            rows = status.row_count,
            columns = status.column_count,
            token = %status.token,
            "Dataset loaded"
        ),
        Ok(_) => warn!(
            "Dataset file {} not found, serving empty results",
            config.dataset.path.display()
        ),
        Err(e) => warn!("Initial dataset load failed: {}", e),
    }

    let app_state = AppState::new(Arc::clone(&query_service), config.query.clone());
    info!("Application state created");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        query_service,
    ));
    let api_router = api::create_router(app_state, &config.server.cors_origins);
    let router = create_observability_router(Arc::clone(&observability_state))
        .merge(api_router)
        .layer(middleware::from_fn_with_state(
            observability_state,
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http());
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
