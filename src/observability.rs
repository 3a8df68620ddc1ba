use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::ToSchema;

/// Application health status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthChecks {
    pub api: String,
    pub stock_usecase: String,
}

/// Application metrics
#[derive(Debug, Clone)]
pub struct AppMetrics {
    pub start_time: Instant,
    pub total_requests: Arc<RwLock<u64>>,
    pub successful_requests: Arc<RwLock<u64>>,
    pub failed_requests: Arc<RwLock<u64>>,
    pub stocks_created: Arc<RwLock<u64>>,
    pub csv_exports: Arc<RwLock<u64>>,
}

impl AppMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            total_requests: Arc::new(RwLock::new(0)),
            successful_requests: Arc::new(RwLock::new(0)),
            failed_requests: Arc::new(RwLock::new(0)),
            stocks_created: Arc::new(RwLock::new(0)),
            csv_exports: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn increment_requests(&self) {
        *self.total_requests.write().await += 1;
    }

    pub async fn increment_success(&self) {
        *self.successful_requests.write().await += 1;
    }

    pub async fn increment_failure(&self) {
        *self.failed_requests.write().await += 1;
    }

    pub async fn add_stocks_created(&self, count: u64) {
        *self.stocks_created.write().await += count;
    }

    pub async fn increment_csv_exports(&self) {
        *self.csv_exports.write().await += 1;
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for AppMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Count every request and classify it by the response status.
pub async fn track_requests(
    State(metrics): State<Arc<AppMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    metrics.increment_requests().await;
    let response = next.run(req).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        metrics.increment_failure().await;
    } else {
        metrics.increment_success().await;
    }

    response
}

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy", body = HealthStatus)),
    tag = "System"
)]
pub async fn health_handler(State(metrics): State<Arc<AppMetrics>>) -> impl IntoResponse {
    let uptime = metrics.uptime_seconds();

    let health = HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        checks: HealthChecks {
            api: "ok".to_string(),
            stock_usecase: "ok".to_string(),
        },
    };

    info!(
        "Health check requested - status: healthy, uptime: {}s",
        uptime
    );
    (StatusCode::OK, Json(health))
}

/// Metrics endpoint handler
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub stocks_created: u64,
    pub csv_exports: u64,
    pub success_rate: f64,
}

#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Request counters", body = MetricsResponse)),
    tag = "System"
)]
pub async fn metrics_handler(State(metrics): State<Arc<AppMetrics>>) -> impl IntoResponse {
    let uptime = metrics.uptime_seconds();
    let total = *metrics.total_requests.read().await;
    let success = *metrics.successful_requests.read().await;
    let failed = *metrics.failed_requests.read().await;
    let created = *metrics.stocks_created.read().await;
    let exports = *metrics.csv_exports.read().await;

    let success_rate = if total > 0 {
        (success as f64 / total as f64) * 100.0
    } else {
        100.0
    };

    let response = MetricsResponse {
        uptime_seconds: uptime,
        total_requests: total,
        successful_requests: success,
        failed_requests: failed,
        stocks_created: created,
        csv_exports: exports,
        success_rate,
    };

    (StatusCode::OK, Json(response))
}

/// Initialize tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is a
/// no-op.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let filter_desc = filter.to_string();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .json()
        .try_init();

    info!("Tracing initialized with filter: {}", filter_desc);
}
