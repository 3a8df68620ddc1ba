use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::extract::{Validate, ValidationError};

/// Longest accepted stock name, counted in characters.
pub const MAX_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Stock {
    /// Stock identifier
    pub id: i64,
    /// Product name
    pub name: String,
    /// Unit price in yen
    pub price: i64,
    /// Units on hand
    pub quantity: i64,
    /// Owning store
    pub store_id: String,
    /// User who last wrote this record
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StocksQuery {
    /// Maximum number of stocks to return
    #[param(minimum = 0, example = 10)]
    pub limit: Option<i64>,
    /// Number of stocks to skip
    #[param(minimum = 0, example = 0)]
    pub offset: Option<i64>,
}

impl Validate for StocksQuery {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(limit) = self.limit {
            if limit < 0 {
                return Err(ValidationError::new("limit", "must be 0 or greater"));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(ValidationError::new("offset", "must be 0 or greater"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct StockPath {
    /// Stock identifier
    #[param(minimum = 1)]
    pub id: i64,
}

impl Validate for StockPath {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.id < 1 {
            return Err(ValidationError::new("id", "must be 1 or greater"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateStockRequest {
    /// Product name (1-100 characters)
    pub name: String,
    /// Unit price in yen
    pub price: i64,
    /// Units on hand
    pub quantity: i64,
}

impl Validate for CreateStockRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_stock_fields(&self.name, self.price, self.quantity)
    }
}

/// Body of `POST /stocks/bulk`: a bare JSON array of stocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreateBulkStockRequest {
    pub stocks: Vec<CreateStockRequest>,
}

impl Validate for CreateBulkStockRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.stocks.is_empty() {
            return Err(ValidationError::new("stocks", "must contain at least one stock"));
        }
        for (index, stock) in self.stocks.iter().enumerate() {
            stock.validate().map_err(|e| e.at_index(index))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    /// Product name (1-100 characters)
    pub name: String,
    /// Unit price in yen
    pub price: i64,
    /// Units on hand
    pub quantity: i64,
}

impl Validate for UpdateStockRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_stock_fields(&self.name, self.price, self.quantity)
    }
}

fn validate_stock_fields(name: &str, price: i64, quantity: i64) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("name", "is required"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::new(
            "name",
            format!("must be at most {MAX_NAME_CHARS} characters"),
        ));
    }
    if price < 0 {
        return Err(ValidationError::new("price", "must be 0 or greater"));
    }
    if quantity < 0 {
        return Err(ValidationError::new("quantity", "must be 0 or greater"));
    }
    Ok(())
}
