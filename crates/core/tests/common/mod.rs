//! Shared in-memory store for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use stockview_core::stocks::{PricePoint, Stock, StockRepositoryTrait, StockSortField};
use stockview_core::Result;

#[derive(Clone, Default)]
pub struct InMemoryStockStore {
    // Insertion order is the store's native order
    stocks: Arc<Mutex<Vec<Stock>>>,
    history: Arc<Mutex<BTreeMap<(String, chrono::NaiveDate), f64>>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Stock> {
        self.stocks.lock().unwrap().clone()
    }
}

#[async_trait]
impl StockRepositoryTrait for InMemoryStockStore {
    fn get_stock(&self, code: &str) -> Result<Option<Stock>> {
        Ok(self.snapshot().into_iter().find(|s| s.code == code))
    }

    fn get_stock_by_name(&self, name: &str) -> Result<Option<Stock>> {
        Ok(self.snapshot().into_iter().find(|s| s.name == name))
    }

    fn list_top(
        &self,
        limit: usize,
        _sort_field: StockSortField,
        descending: bool,
    ) -> Result<Vec<Stock>> {
        let mut stocks = self.snapshot();
        if descending {
            stocks.sort_by(|a, b| b.close.total_cmp(&a.close));
        } else {
            stocks.sort_by(|a, b| a.close.total_cmp(&b.close));
        }
        stocks.truncate(limit);
        Ok(stocks)
    }

    fn list_favorites(&self) -> Result<Vec<Stock>> {
        Ok(self.snapshot().into_iter().filter(|s| s.is_favorite).collect())
    }

    fn get_price_history(&self, code: &str) -> Result<Vec<PricePoint>> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|((c, _), _)| c == code)
            .map(|((_, date), price)| PricePoint {
                date: *date,
                price: *price,
            })
            .collect())
    }

    async fn upsert_stock(&self, stock: Stock, price_point: Option<PricePoint>) -> Result<()> {
        if let Some(point) = price_point {
            self.history
                .lock()
                .unwrap()
                .insert((stock.code.clone(), point.date), point.price);
        }
        let mut stocks = self.stocks.lock().unwrap();
        match stocks.iter_mut().find(|s| s.code == stock.code) {
            Some(existing) => *existing = stock,
            None => stocks.push(stock),
        }
        Ok(())
    }

    async fn delete_stock(&self, code: &str) -> Result<usize> {
        self.history.lock().unwrap().retain(|(c, _), _| c != code);
        let mut stocks = self.stocks.lock().unwrap();
        let before = stocks.len();
        stocks.retain(|s| s.code != code);
        Ok(before - stocks.len())
    }
}
