use std::sync::Arc;

use anyhow::Context;
use stock_api::config::AppConfig;
use stock_api::observability::init_tracing;
use stock_api::routes::{build_app, AppState};
use stock_api::usecase::InMemoryStockUsecase;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_filter);

    let state = AppState::new(Arc::new(InMemoryStockUsecase::new()));
    let app = build_app(state, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let addr = config.bind_addr;
    info!("Server running on http://{}", addr);
    info!("Stocks API endpoint: http://{}/stocks", addr);
    info!("CSV export endpoint: http://{}/stocks/csv", addr);
    info!("Swagger UI: http://{}/swagger-ui/", addr);
    info!("OpenAPI JSON: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
