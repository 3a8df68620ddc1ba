use crate::config::AppConfig;
use crate::context::store_context_middleware;
use crate::handlers::{
    create_bulk_stock_handler, create_stock_handler, delete_stock_handler,
    download_stocks_csv_handler, get_stock_handler, get_stocks_handler, update_stock_handler,
};
use crate::observability::{health_handler, metrics_handler, track_requests, AppMetrics};
use crate::openapi::ApiDoc;
use crate::usecase::StockUsecase;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
pub struct AppState {
    pub usecase: Arc<dyn StockUsecase>,
    pub metrics: Arc<AppMetrics>,
}

impl AppState {
    pub fn new(usecase: Arc<dyn StockUsecase>) -> Self {
        Self {
            usecase,
            metrics: Arc::new(AppMetrics::new()),
        }
    }
}

impl FromRef<AppState> for Arc<AppMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

/// API routes with request counting; `/stocks` routes require a store context.
pub fn create_router(state: AppState) -> Router {
    let stocks = Router::new()
        .route("/stocks", get(get_stocks_handler).post(create_stock_handler))
        .route("/stocks/bulk", post(create_bulk_stock_handler))
        .route("/stocks/csv", get(download_stocks_csv_handler))
        .route(
            "/stocks/{id}",
            get(get_stock_handler)
                .put(update_stock_handler)
                .delete(delete_stock_handler),
        )
        .route_layer(middleware::from_fn(store_context_middleware));

    Router::new()
        .merge(stocks)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .with_state(state)
}

/// Everything the server binary serves: API routes, Swagger UI and the
/// transport layers.
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);

    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors);

    create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Json and the other body extractors enforce their own 2 MiB cap
        // unless told otherwise; keep both limits on the configured value.
        .layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(layers)
}
