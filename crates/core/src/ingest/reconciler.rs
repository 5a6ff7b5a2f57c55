//! Upsert-by-code reconciliation of a parsed batch against the store.

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::errors::Error;
use crate::stocks::{PricePoint, Stock, StockRepositoryTrait};

/// Counts for one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
    /// Records dropped for having no code
    pub skipped: usize,
    /// Earlier occurrences of a code superseded by a later one in the same batch
    pub duplicates_collapsed: usize,
    pub updated_codes: Vec<String>,
}

impl ReconcileSummary {
    pub fn committed(&self) -> usize {
        self.inserted + self.updated
    }
}

/// A run that stopped on a store failure. Records counted in `summary` were
/// committed and stay committed.
#[derive(Error, Debug)]
#[error("stopped after committing {} records: {source}", .summary.committed())]
pub struct ReconcileError {
    pub summary: ReconcileSummary,
    #[source]
    pub source: Error,
}

/// Drops keyless records and collapses repeated codes. The last occurrence
/// wins and takes the position of the first.
fn collapse_duplicates(batch: Vec<Stock>, summary: &mut ReconcileSummary) -> Vec<Stock> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(batch.len());
    let mut unique: Vec<Stock> = Vec::with_capacity(batch.len());

    for mut stock in batch {
        let code = stock.key().to_string();
        if code.is_empty() {
            warn!("Skipping record without a code (name: '{}')", stock.name);
            summary.skipped += 1;
            continue;
        }
        stock.code = code.clone();
        match positions.get(&code) {
            Some(&index) => {
                unique[index] = stock;
                summary.duplicates_collapsed += 1;
            }
            None => {
                positions.insert(code, unique.len());
                unique.push(stock);
            }
        }
    }

    unique
}

/// Writes `batch` into `store`, inserting unknown codes and replacing known
/// ones. Each record also records a closing `PricePoint` for `as_of`.
///
/// Records are written one at a time, each atomically. The first failure
/// aborts the run without rolling back what was already written; running
/// the same batch again converges to the same state.
pub async fn reconcile(
    store: &dyn StockRepositoryTrait,
    batch: Vec<Stock>,
    as_of: NaiveDate,
) -> std::result::Result<ReconcileSummary, ReconcileError> {
    let mut summary = ReconcileSummary::default();
    let unique = collapse_duplicates(batch, &mut summary);
    debug!(
        "Reconciling {} records ({} duplicates collapsed, {} skipped)",
        unique.len(),
        summary.duplicates_collapsed,
        summary.skipped
    );

    for mut stock in unique {
        let existing = match store.get_stock(&stock.code) {
            Ok(existing) => existing,
            Err(source) => return Err(ReconcileError { summary, source }),
        };

        let is_update = existing.is_some();
        // The feed has no favorite column
        if let Some(existing) = existing {
            stock.is_favorite = existing.is_favorite;
        }

        let code = stock.code.clone();
        let point = PricePoint {
            date: as_of,
            price: stock.close,
        };
        if let Err(source) = store.upsert_stock(stock, Some(point)).await {
            return Err(ReconcileError { summary, source });
        }

        if is_update {
            summary.updated += 1;
            summary.updated_codes.push(code);
        } else {
            summary.inserted += 1;
        }
    }

    info!(
        "Reconciled batch: {} inserted, {} updated, {} skipped",
        summary.inserted, summary.updated, summary.skipped
    );
    Ok(summary)
}
