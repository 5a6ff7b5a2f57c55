use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::stocks_model::{PricePoint, Stock, StockSortField};
use super::stocks_traits::{StockRepositoryTrait, StockServiceTrait};
use crate::cache::TtlCache;
use crate::constants::{MAX_TOP_N, PRICE_HISTORY_CACHE_TTL};
use crate::errors::{Error, Result, ValidationError};

/// Query service over the stock store.
///
/// Price history goes through a cache-aside TTL cache. Two concurrent misses
/// for the same code both read the store and both populate the cache; the
/// later write wins.
pub struct StockService {
    repository: Arc<dyn StockRepositoryTrait>,
    price_history_cache: Arc<TtlCache<Vec<PricePoint>>>,
    price_history_ttl: Duration,
}

impl StockService {
    pub fn new(repository: Arc<dyn StockRepositoryTrait>) -> Self {
        Self::with_cache(
            repository,
            Arc::new(TtlCache::new()),
            PRICE_HISTORY_CACHE_TTL,
        )
    }

    pub fn with_cache(
        repository: Arc<dyn StockRepositoryTrait>,
        price_history_cache: Arc<TtlCache<Vec<PricePoint>>>,
        price_history_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            price_history_cache,
            price_history_ttl,
        }
    }

    fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                field.to_string(),
            )));
        }
        Ok(trimmed)
    }
}

#[async_trait::async_trait]
impl StockServiceTrait for StockService {
    /// Highest closing prices first
    fn get_top_stocks(&self, limit: usize) -> Result<Vec<Stock>> {
        if limit == 0 || limit > MAX_TOP_N {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_TOP_N
            ))));
        }
        self.repository.list_top(limit, StockSortField::Close, true)
    }

    fn get_stock_by_code(&self, code: &str) -> Result<Stock> {
        let code = Self::require(code, "code")?;
        self.repository
            .get_stock(code)?
            .ok_or_else(|| Error::NotFound(format!("stock with code '{}'", code)))
    }

    fn get_stock_by_name(&self, name: &str) -> Result<Stock> {
        let name = Self::require(name, "name")?;
        self.repository
            .get_stock_by_name(name)?
            .ok_or_else(|| Error::NotFound(format!("stock named '{}'", name)))
    }

    fn get_price_history(&self, code: &str) -> Result<Vec<PricePoint>> {
        let code = Self::require(code, "code")?;
        if let Some(history) = self.price_history_cache.get(code) {
            debug!("Price history cache hit for {}", code);
            return Ok(history);
        }

        let history = self.repository.get_price_history(code)?;
        self.price_history_cache
            .set(code, history.clone(), self.price_history_ttl);
        Ok(history)
    }

    fn get_favorite_stocks(&self) -> Result<Vec<Stock>> {
        self.repository.list_favorites()
    }

    /// Stores the full payload as given. The favorite flag is taken from the
    /// payload, not forced on.
    async fn add_to_favorites(&self, stock: Stock) -> Result<()> {
        Self::require(&stock.code, "code")?;
        let mut stock = stock;
        stock.code = stock.code.trim().to_string();
        self.repository.upsert_stock(stock, None).await
    }

    /// Deletes the whole stock row, not just the favorite flag.
    async fn remove_from_favorites(&self, code: &str) -> Result<usize> {
        let code = Self::require(code, "code")?;
        let removed = self.repository.delete_stock(code).await?;
        if removed == 0 {
            warn!("remove_from_favorites: no stock with code {}", code);
        }
        Ok(removed)
    }
}
