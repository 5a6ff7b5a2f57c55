//! Stock domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One instrument's daily snapshot as published in the equity bhavcopy.
///
/// `code` is the identity: two stocks with the same code are the same row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(rename = "type", default)]
    pub stock_type: String,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub close: f64,
    #[serde(default)]
    pub last: f64,
    #[serde(default)]
    pub prev_close: f64,
    #[serde(default)]
    pub no_trades: i64,
    #[serde(default)]
    pub no_of_shares: i64,
    #[serde(default)]
    pub net_turnover: f64,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Stock {
    /// Returns the stock code with surrounding whitespace removed.
    pub fn key(&self) -> &str {
        self.code.trim()
    }
}

/// A single dated closing price for a stock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Fields a stock listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StockSortField {
    #[default]
    Close,
    NetTurnover,
    NoTrades,
}
