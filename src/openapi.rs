use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::observability::{HealthChecks, HealthStatus, MetricsResponse};
use crate::types::{CreateStockRequest, Stock, UpdateStockRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_stocks_handler,
        crate::handlers::get_stock_handler,
        crate::handlers::create_stock_handler,
        crate::handlers::create_bulk_stock_handler,
        crate::handlers::update_stock_handler,
        crate::handlers::delete_stock_handler,
        crate::handlers::download_stocks_csv_handler,
        crate::observability::health_handler,
        crate::observability::metrics_handler
    ),
    components(schemas(
        Stock,
        CreateStockRequest,
        UpdateStockRequest,
        HealthStatus,
        HealthChecks,
        MetricsResponse
    )),
    modifiers(&StoreContextSecurity),
    tags(
        (name = "Stocks", description = "Stock management endpoints"),
        (name = "System", description = "Health and metrics")
    ),
    info(
        title = "Stock Management API",
        description = "CRUD and CSV export for store inventory",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Documents the store and user headers the auth gateway injects.
struct StoreContextSecurity;

impl Modify for StoreContextSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "store_context",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Store-Id"))),
            );
            components.add_security_scheme(
                "user_context",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Id"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_stock_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in ["/stocks", "/stocks/{id}", "/stocks/bulk", "/stocks/csv", "/health"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }

    #[test]
    fn test_openapi_has_store_context_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("store_context"));
        assert!(components.security_schemes.contains_key("user_context"));
    }

    #[test]
    fn test_stock_operations_require_both_context_headers() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let security = &doc["paths"]["/stocks"]["post"]["security"][0];
        assert!(security.get("store_context").is_some());
        assert!(security.get("user_context").is_some());

        let health = &doc["paths"]["/health"]["get"];
        assert!(health.get("security").is_none());
    }
}
