use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use stockview_core::ingest::IngestionReport;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Runs one ingestion of the configured feed and returns its report.
async fn run_ingestion(State(state): State<Arc<AppState>>) -> ApiResult<Json<IngestionReport>> {
    let report = state
        .ingestion_service
        .ingest(&state.feed_location())
        .await
        .map_err(ApiError::core("Failed to ingest bhavcopy"))?;
    Ok(Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ingest", post(run_ingestion))
}
