use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use std::sync::Arc;

use stockview_core::stocks::{PricePoint, Stock, StockRepositoryTrait, StockSortField};
use stockview_core::Result;

use super::model::{PricePointDB, StockDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{stock_price_history, stocks};

pub struct StockRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl StockRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        StockRepository { pool, writer }
    }

    fn list_top_impl(
        &self,
        limit: usize,
        sort_field: StockSortField,
        descending: bool,
    ) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = stocks::table.select(StockDB::as_select()).into_boxed();
        query = match (sort_field, descending) {
            (StockSortField::Close, true) => query.order(stocks::close.desc()),
            (StockSortField::Close, false) => query.order(stocks::close.asc()),
            (StockSortField::NetTurnover, true) => query.order(stocks::net_turnover.desc()),
            (StockSortField::NetTurnover, false) => query.order(stocks::net_turnover.asc()),
            (StockSortField::NoTrades, true) => query.order(stocks::no_trades.desc()),
            (StockSortField::NoTrades, false) => query.order(stocks::no_trades.asc()),
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = query
            .limit(limit)
            .load::<StockDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }
}

#[async_trait]
impl StockRepositoryTrait for StockRepository {
    fn get_stock(&self, code: &str) -> Result<Option<Stock>> {
        let mut conn = get_connection(&self.pool)?;
        let row = stocks::table
            .find(code)
            .select(StockDB::as_select())
            .first::<StockDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Stock::from))
    }

    fn get_stock_by_name(&self, name: &str) -> Result<Option<Stock>> {
        let mut conn = get_connection(&self.pool)?;
        let row = stocks::table
            .filter(stocks::name.eq(name))
            .select(StockDB::as_select())
            .first::<StockDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Stock::from))
    }

    fn list_top(
        &self,
        limit: usize,
        sort_field: StockSortField,
        descending: bool,
    ) -> Result<Vec<Stock>> {
        self.list_top_impl(limit, sort_field, descending)
    }

    fn list_favorites(&self) -> Result<Vec<Stock>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = stocks::table
            .filter(stocks::is_favorite.eq(true))
            .select(StockDB::as_select())
            .load::<StockDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Stock::from).collect())
    }

    fn get_price_history(&self, code: &str) -> Result<Vec<PricePoint>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = stock_price_history::table
            .filter(stock_price_history::code.eq(code))
            .order(stock_price_history::date.asc())
            .select(PricePointDB::as_select())
            .load::<PricePointDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(PricePoint::from).collect())
    }

    async fn upsert_stock(&self, stock: Stock, price_point: Option<PricePoint>) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let stock_db: StockDB = stock.into();
                diesel::insert_into(stocks::table)
                    .values(&stock_db)
                    .on_conflict(stocks::code)
                    .do_update()
                    .set(&stock_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if let Some(point) = price_point {
                    let point_db = PricePointDB::new(&stock_db.code, point);
                    diesel::insert_into(stock_price_history::table)
                        .values(&point_db)
                        .on_conflict((stock_price_history::code, stock_price_history::date))
                        .do_update()
                        .set(stock_price_history::price.eq(excluded(stock_price_history::price)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(())
            })
            .await
    }

    async fn delete_stock(&self, code: &str) -> Result<usize> {
        let code = code.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(
                    stock_price_history::table.filter(stock_price_history::code.eq(code.as_str())),
                )
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(diesel::delete(stocks::table.find(code.as_str()))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
