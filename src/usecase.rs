//! Usecase boundary for stock operations.
//!
//! Handlers only talk to [`StockUsecase`]. The in-memory implementation backs
//! the binary and the tests; a database-backed one can be dropped in without
//! touching the HTTP layer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::Stock;

/// Upper bound on the number of stocks a single listing returns.
pub const MAX_STOCKS_LIMIT: usize = 50_000;

#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("stock {stock_id} not found")]
    NotFound { stock_id: i64 },

    #[error("storage failure: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetStocksInput {
    pub store_id: String,
    /// `None` means "as many as allowed", i.e. [`MAX_STOCKS_LIMIT`].
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateStockInput {
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub store_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStockInput {
    pub stock_id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub store_id: String,
    pub user_id: String,
}

#[async_trait]
pub trait StockUsecase: Send + Sync {
    async fn get_stocks(&self, input: GetStocksInput) -> Result<Vec<Stock>, UsecaseError>;

    async fn get_stock(&self, store_id: &str, stock_id: i64) -> Result<Stock, UsecaseError>;

    async fn create_stock(&self, input: CreateStockInput) -> Result<Stock, UsecaseError>;

    /// Create every stock or none of them; returns the new ids in input order.
    async fn create_bulk_stock(
        &self,
        inputs: Vec<CreateStockInput>,
    ) -> Result<Vec<i64>, UsecaseError>;

    async fn update_stock(&self, input: UpdateStockInput) -> Result<Stock, UsecaseError>;

    async fn delete_stock(&self, store_id: &str, stock_id: i64) -> Result<(), UsecaseError>;
}

#[derive(Debug, Default)]
struct Inventory {
    next_id: i64,
    stocks: BTreeMap<i64, Stock>,
}

impl Inventory {
    fn insert(&mut self, input: CreateStockInput) -> Stock {
        self.next_id += 1;
        let now = Utc::now();
        let stock = Stock {
            id: self.next_id,
            name: input.name,
            price: input.price,
            quantity: input.quantity,
            store_id: input.store_id,
            user_id: input.user_id,
            created_at: now,
            updated_at: now,
        };
        self.stocks.insert(stock.id, stock.clone());
        stock
    }

    fn owned_mut(&mut self, store_id: &str, stock_id: i64) -> Result<&mut Stock, UsecaseError> {
        self.stocks
            .get_mut(&stock_id)
            .filter(|s| s.store_id == store_id)
            .ok_or(UsecaseError::NotFound { stock_id })
    }
}

/// Store-partitioned stock usecase held entirely in memory.
///
/// Ids are global and sequential; a stock is only visible to the store that
/// owns it.
#[derive(Debug, Default)]
pub struct InMemoryStockUsecase {
    inner: RwLock<Inventory>,
}

impl InMemoryStockUsecase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockUsecase for InMemoryStockUsecase {
    async fn get_stocks(&self, input: GetStocksInput) -> Result<Vec<Stock>, UsecaseError> {
        let limit = clamp_limit(input.limit);
        let offset = input.offset.map_or(0, |o| usize::try_from(o).unwrap_or(0));

        let inventory = self.inner.read().await;
        let stocks: Vec<Stock> = inventory
            .stocks
            .values()
            .filter(|s| s.store_id == input.store_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        debug!(
            store_id = %input.store_id,
            limit,
            offset,
            returned = stocks.len(),
            "listed stocks"
        );
        Ok(stocks)
    }

    async fn get_stock(&self, store_id: &str, stock_id: i64) -> Result<Stock, UsecaseError> {
        let inventory = self.inner.read().await;
        inventory
            .stocks
            .get(&stock_id)
            .filter(|s| s.store_id == store_id)
            .cloned()
            .ok_or(UsecaseError::NotFound { stock_id })
    }

    async fn create_stock(&self, input: CreateStockInput) -> Result<Stock, UsecaseError> {
        let mut inventory = self.inner.write().await;
        Ok(inventory.insert(input))
    }

    async fn create_bulk_stock(
        &self,
        inputs: Vec<CreateStockInput>,
    ) -> Result<Vec<i64>, UsecaseError> {
        // The write lock is held for the whole batch, so no reader observes a
        // partially inserted bulk.
        let mut inventory = self.inner.write().await;
        let ids = inputs
            .into_iter()
            .map(|input| inventory.insert(input).id)
            .collect();
        Ok(ids)
    }

    async fn update_stock(&self, input: UpdateStockInput) -> Result<Stock, UsecaseError> {
        let mut inventory = self.inner.write().await;
        let stock = inventory.owned_mut(&input.store_id, input.stock_id)?;
        stock.name = input.name;
        stock.price = input.price;
        stock.quantity = input.quantity;
        stock.user_id = input.user_id;
        stock.updated_at = Utc::now();
        Ok(stock.clone())
    }

    async fn delete_stock(&self, store_id: &str, stock_id: i64) -> Result<(), UsecaseError> {
        let mut inventory = self.inner.write().await;
        inventory.owned_mut(store_id, stock_id)?;
        inventory.stocks.remove(&stock_id);
        Ok(())
    }
}

fn clamp_limit(limit: Option<i64>) -> usize {
    match limit {
        None => MAX_STOCKS_LIMIT,
        Some(n) => usize::try_from(n).unwrap_or(0).min(MAX_STOCKS_LIMIT),
    }
}
