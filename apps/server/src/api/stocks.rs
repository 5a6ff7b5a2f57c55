use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use stockview_core::{
    constants::DEFAULT_TOP_N,
    stocks::{PricePoint, Stock},
};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct TopQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct CodeQuery {
    code: Option<String>,
}

#[derive(Deserialize)]
struct NameQuery {
    name: Option<String>,
}

fn required(value: Option<String>, what: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Stock {} parameter is missing", what)))
}

async fn get_top_stocks(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TopQuery>,
) -> ApiResult<Json<Vec<Stock>>> {
    let stocks = state
        .stock_service
        .get_top_stocks(q.limit.unwrap_or(DEFAULT_TOP_N))
        .map_err(ApiError::core("Failed to fetch top stocks"))?;
    Ok(Json(stocks))
}

async fn get_stock_by_code(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CodeQuery>,
) -> ApiResult<Json<Stock>> {
    let code = required(q.code, "code")?;
    let stock = state
        .stock_service
        .get_stock_by_code(&code)
        .map_err(ApiError::core("Failed to fetch stock by code"))?;
    Ok(Json(stock))
}

async fn get_stock_by_name(
    State(state): State<Arc<AppState>>,
    Query(q): Query<NameQuery>,
) -> ApiResult<Json<Stock>> {
    let name = required(q.name, "name")?;
    let stock = state
        .stock_service
        .get_stock_by_name(&name)
        .map_err(ApiError::core("Failed to fetch stock by name"))?;
    Ok(Json(stock))
}

async fn get_price_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CodeQuery>,
) -> ApiResult<Json<Vec<PricePoint>>> {
    let code = required(q.code, "code")?;
    let history = state
        .stock_service
        .get_price_history(&code)
        .map_err(ApiError::core("Failed to fetch stock price history"))?;
    Ok(Json(history))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks/top", get(get_top_stocks))
        .route("/stocks/by-code", get(get_stock_by_code))
        .route("/stocks/by-name", get(get_stock_by_name))
        .route("/stocks/price-history", get(get_price_history))
}
