use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use stockview_core::stocks::Stock;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct CodeQuery {
    code: Option<String>,
}

async fn get_favorite_stocks(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Stock>>> {
    let favorites = state
        .stock_service
        .get_favorite_stocks()
        .map_err(ApiError::core("Failed to fetch favorite stocks"))?;
    Ok(Json(favorites))
}

async fn add_to_favorites(
    State(state): State<Arc<AppState>>,
    Json(stock): Json<Stock>,
) -> ApiResult<StatusCode> {
    state
        .stock_service
        .add_to_favorites(stock)
        .await
        .map_err(ApiError::core("Failed to add stock to favorites"))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_from_favorites(
    State(state): State<Arc<AppState>>,
    Query(q): Query<CodeQuery>,
) -> ApiResult<StatusCode> {
    let code = q
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Stock code parameter is missing".to_string()))?;
    let _ = state
        .stock_service
        .remove_from_favorites(&code)
        .await
        .map_err(ApiError::core("Failed to remove stock from favorites"))?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/favorites",
        get(get_favorite_stocks)
            .post(add_to_favorites)
            .delete(remove_from_favorites),
    )
}
