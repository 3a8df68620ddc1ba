use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use tracing::{error, info};

use crate::context::StoreContext;
use crate::error::{AppError, AppResult};
use crate::export::{export_filename, write_stocks_csv, CSV_CONTENT_TYPE};
use crate::extract::{ValidJson, ValidPath, ValidQuery};
use crate::routes::AppState;
use crate::types::{
    CreateBulkStockRequest, CreateStockRequest, Stock, StockPath, StocksQuery, UpdateStockRequest,
};
use crate::usecase::{CreateStockInput, GetStocksInput, UpdateStockInput};

#[utoipa::path(
    get,
    path = "/stocks",
    params(StocksQuery),
    responses(
        (status = 200, description = "Stocks of the caller's store", body = Vec<Stock>),
        (status = 400, description = "Invalid limit or offset"),
        (status = 500, description = "Usecase failure")
    ),
    security(("store_context" = [], "user_context" = [])),
    tag = "Stocks"
)]
pub async fn get_stocks_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
    ValidQuery(query): ValidQuery<StocksQuery>,
) -> AppResult<Json<Vec<Stock>>> {
    let stocks = state
        .usecase
        .get_stocks(GetStocksInput {
            store_id: ctx.store_id().to_string(),
            limit: query.limit,
            offset: query.offset,
        })
        .await?;

    Ok(Json(stocks))
}

#[utoipa::path(
    get,
    path = "/stocks/{id}",
    params(StockPath),
    responses(
        (status = 200, description = "The stock", body = Stock),
        (status = 400, description = "Invalid id"),
        (status = 500, description = "Usecase failure")
    ),
    security(("store_context" = [], "user_context" = [])),
    tag = "Stocks"
)]
pub async fn get_stock_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
    ValidPath(path): ValidPath<StockPath>,
) -> AppResult<Json<Stock>> {
    let stock = state.usecase.get_stock(ctx.store_id(), path.id).await?;
    Ok(Json(stock))
}

#[utoipa::path(
    post,
    path = "/stocks",
    request_body = CreateStockRequest,
    responses(
        (status = 201, description = "Created stock", body = Stock),
        (status = 400, description = "Invalid stock"),
        (status = 500, description = "Usecase failure")
    ),
    security(("store_context" = [], "user_context" = [])),
    tag = "Stocks"
)]
pub async fn create_stock_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
    ValidJson(body): ValidJson<CreateStockRequest>,
) -> AppResult<(StatusCode, Json<Stock>)> {
    let stock = state
        .usecase
        .create_stock(create_input(&ctx, body))
        .await?;

    state.metrics.add_stocks_created(1).await;
    info!(
        "Created stock id={} for store_id={}",
        stock.id,
        ctx.store_id()
    );
    Ok((StatusCode::CREATED, Json(stock)))
}

#[utoipa::path(
    post,
    path = "/stocks/bulk",
    request_body = Vec<CreateStockRequest>,
    responses(
        (status = 201, description = "Ids of the created stocks, in request order", body = Vec<i64>),
        (status = 400, description = "Empty list or an invalid stock"),
        (status = 500, description = "Usecase failure")
    ),
    security(("store_context" = [], "user_context" = [])),
    tag = "Stocks"
)]
pub async fn create_bulk_stock_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
    ValidJson(body): ValidJson<CreateBulkStockRequest>,
) -> AppResult<(StatusCode, Json<Vec<i64>>)> {
    let inputs = body
        .stocks
        .into_iter()
        .map(|stock| create_input(&ctx, stock))
        .collect();

    let ids = state.usecase.create_bulk_stock(inputs).await?;

    state.metrics.add_stocks_created(ids.len() as u64).await;
    info!(
        "Bulk created {} stocks for store_id={}",
        ids.len(),
        ctx.store_id()
    );
    Ok((StatusCode::CREATED, Json(ids)))
}

#[utoipa::path(
    put,
    path = "/stocks/{id}",
    params(StockPath),
    request_body = UpdateStockRequest,
    responses(
        (status = 200, description = "Updated stock", body = Stock),
        (status = 400, description = "Invalid id or stock"),
        (status = 500, description = "Usecase failure")
    ),
    security(("store_context" = [], "user_context" = [])),
    tag = "Stocks"
)]
pub async fn update_stock_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
    ValidPath(path): ValidPath<StockPath>,
    ValidJson(body): ValidJson<UpdateStockRequest>,
) -> AppResult<Json<Stock>> {
    let stock = state
        .usecase
        .update_stock(UpdateStockInput {
            stock_id: path.id,
            name: body.name,
            price: body.price,
            quantity: body.quantity,
            store_id: ctx.store_id().to_string(),
            user_id: ctx.user_id().to_string(),
        })
        .await?;

    Ok(Json(stock))
}

#[utoipa::path(
    delete,
    path = "/stocks/{id}",
    params(StockPath),
    responses(
        (status = 204, description = "Stock deleted"),
        (status = 400, description = "Invalid id"),
        (status = 500, description = "Usecase failure")
    ),
    security(("store_context" = [], "user_context" = [])),
    tag = "Stocks"
)]
pub async fn delete_stock_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
    ValidPath(path): ValidPath<StockPath>,
) -> AppResult<StatusCode> {
    state.usecase.delete_stock(ctx.store_id(), path.id).await?;
    info!(
        "Deleted stock id={} for store_id={}",
        path.id,
        ctx.store_id()
    );
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/stocks/csv",
    responses(
        (status = 200, description = "CSV data", body = String, content_type = "text/csv"),
        (status = 500, description = "Usecase or CSV failure")
    ),
    security(("store_context" = [], "user_context" = [])),
    tag = "Stocks"
)]
pub async fn download_stocks_csv_handler(
    State(state): State<AppState>,
    Extension(ctx): Extension<StoreContext>,
) -> AppResult<Response> {
    info!("CSV download requested for store_id={}", ctx.store_id());

    // No limit: the usecase caps the listing at MAX_STOCKS_LIMIT rows.
    let stocks = state
        .usecase
        .get_stocks(GetStocksInput {
            store_id: ctx.store_id().to_string(),
            limit: None,
            offset: None,
        })
        .await?;
    let row_count = stocks.len();

    // Rendering up to 50k rows is CPU work; keep it off the async workers.
    let body = tokio::task::spawn_blocking(move || write_stocks_csv(&stocks))
        .await
        .map_err(|e| {
            error!("CSV export task error: {}", e);
            AppError::InternalError(format!("CSV export task failed: {e}"))
        })??;

    let filename = export_filename(Utc::now());
    state.metrics.increment_csv_exports().await;
    info!(
        "Generated CSV {} with {} rows for store_id={}",
        filename,
        row_count,
        ctx.store_id()
    );

    let headers = [
        (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((StatusCode::OK, headers, body).into_response())
}

fn create_input(ctx: &StoreContext, stock: CreateStockRequest) -> CreateStockInput {
    CreateStockInput {
        name: stock.name,
        price: stock.price,
        quantity: stock.quantity,
        store_id: ctx.store_id().to_string(),
        user_id: ctx.user_id().to_string(),
    }
}
