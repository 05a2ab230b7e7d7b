// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::dataset_cache::SystemClock;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::mysql_repository::MySqlRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    export_map_data, export_records, get_dashboard, health_check, list_filters,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(MySqlRepository::connect_lazy(
        &config.database.url,
        config.database.max_connections,
    )?);

    // Create services (application layer)
    let dashboard_service = DashboardService::new(
        repository,
        Arc::new(SystemClock),
        config.cache.ttl(),
        config.view.recent_limit,
        config.view.ring_points,
    );

    let state = Arc::new(AppState {
        dashboard_service,
        export_prefix: config.view.export_prefix.clone(),
    });

    // Build router (presentation layer)
    // JSON bodies are compressed in the response builders, so no CompressionLayer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/filters", get(list_filters))
        .route("/dashboard", get(get_dashboard))
        .route("/export/map.csv", get(export_map_data))
        .route("/export/records.csv", get(export_records))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting air-quality dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
