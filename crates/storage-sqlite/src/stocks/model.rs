//! Database models for stocks.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use stockview_core::stocks::{PricePoint, Stock};

/// Database model for a stock row
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::stocks)]
#[diesel(primary_key(code))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct StockDB {
    pub code: String,
    pub name: String,
    pub group_name: String,
    pub stock_type: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub last: f64,
    pub prev_close: f64,
    pub no_trades: i64,
    pub no_of_shares: i64,
    pub net_turnover: f64,
    pub is_favorite: bool,
    pub updated_at: NaiveDateTime,
}

/// Database model for one dated closing price
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::stock_price_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PricePointDB {
    pub code: String,
    pub date: NaiveDate,
    pub price: f64,
}

// Conversion to domain models
impl From<StockDB> for Stock {
    fn from(db: StockDB) -> Self {
        Self {
            code: db.code,
            name: db.name,
            group: db.group_name,
            stock_type: db.stock_type,
            open: db.open,
            high: db.high,
            low: db.low,
            close: db.close,
            last: db.last,
            prev_close: db.prev_close,
            no_trades: db.no_trades,
            no_of_shares: db.no_of_shares,
            net_turnover: db.net_turnover,
            is_favorite: db.is_favorite,
        }
    }
}

impl From<Stock> for StockDB {
    fn from(domain: Stock) -> Self {
        Self {
            code: domain.code,
            name: domain.name,
            group_name: domain.group,
            stock_type: domain.stock_type,
            open: domain.open,
            high: domain.high,
            low: domain.low,
            close: domain.close,
            last: domain.last,
            prev_close: domain.prev_close,
            no_trades: domain.no_trades,
            no_of_shares: domain.no_of_shares,
            net_turnover: domain.net_turnover,
            is_favorite: domain.is_favorite,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl From<PricePointDB> for PricePoint {
    fn from(db: PricePointDB) -> Self {
        Self {
            date: db.date,
            price: db.price,
        }
    }
}

impl PricePointDB {
    pub fn new(code: &str, point: PricePoint) -> Self {
        Self {
            code: code.to_string(),
            date: point.date,
            price: point.price,
        }
    }
}
