//! Background bhavcopy ingestion.
//!
//! Runs once at startup and/or on a fixed interval, depending on config.

use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Spawns the ingestion task. Does nothing when neither startup ingestion nor
/// an interval is configured.
pub fn start_ingestion_scheduler(
    state: Arc<AppState>,
    run_on_startup: bool,
    every: Option<Duration>,
) {
    if !run_on_startup && every.is_none() {
        return;
    }

    tokio::spawn(async move {
        if run_on_startup {
            run_scheduled_ingestion(&state).await;
        }

        let Some(period) = every else {
            return;
        };
        info!("Ingestion scheduler started ({}s interval)", period.as_secs());
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            run_scheduled_ingestion(&state).await;
        }
    });
}

/// Runs a single ingestion against the current feed location.
async fn run_scheduled_ingestion(state: &Arc<AppState>) {
    let location = state.feed_location();
    info!("Running scheduled ingestion from {}", location);
    match state.ingestion_service.ingest(&location).await {
        Ok(report) => info!(
            "Scheduled ingestion {} completed: {} inserted, {} updated, {} skipped",
            report.run_id,
            report.summary.inserted,
            report.summary.updated,
            report.summary.skipped
        ),
        Err(e) if e.is_transient() => {
            warn!("Scheduled ingestion failed, will retry next run: {}", e)
        }
        Err(e) => warn!("Scheduled ingestion failed: {}", e),
    }
}
