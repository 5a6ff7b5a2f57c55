use crate::errors::Result;
use crate::stocks::stocks_model::{PricePoint, Stock, StockSortField};
use async_trait::async_trait;

/// Trait for stock repository operations
#[async_trait]
pub trait StockRepositoryTrait: Send + Sync {
    /// Looks a stock up by code. A missing row is `Ok(None)`, not an error.
    fn get_stock(&self, code: &str) -> Result<Option<Stock>>;
    fn get_stock_by_name(&self, name: &str) -> Result<Option<Stock>>;
    fn list_top(
        &self,
        limit: usize,
        sort_field: StockSortField,
        descending: bool,
    ) -> Result<Vec<Stock>>;
    fn list_favorites(&self) -> Result<Vec<Stock>>;
    /// Price points for a code, oldest first.
    fn get_price_history(&self, code: &str) -> Result<Vec<PricePoint>>;
    /// Inserts or replaces the stock keyed by code, together with an optional
    /// price point, in one transaction.
    async fn upsert_stock(&self, stock: Stock, price_point: Option<PricePoint>) -> Result<()>;
    /// Deletes the stock and its price history. Returns the number of stock rows removed.
    async fn delete_stock(&self, code: &str) -> Result<usize>;
}

/// Trait for stock service operations
#[async_trait]
pub trait StockServiceTrait: Send + Sync {
    fn get_top_stocks(&self, limit: usize) -> Result<Vec<Stock>>;
    fn get_stock_by_code(&self, code: &str) -> Result<Stock>;
    fn get_stock_by_name(&self, name: &str) -> Result<Stock>;
    fn get_price_history(&self, code: &str) -> Result<Vec<PricePoint>>;
    fn get_favorite_stocks(&self) -> Result<Vec<Stock>>;
    async fn add_to_favorites(&self, stock: Stock) -> Result<()>;
    async fn remove_from_favorites(&self, code: &str) -> Result<usize>;
}
