use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;

use super::extractor::ArchiveExtractor;
use super::fetcher::ArchiveFetcher;
use super::parser::{parse_csv, trade_date_from_member_name};
use super::reconciler::{reconcile, ReconcileSummary};
use crate::errors::Result;
use crate::stocks::StockRepositoryTrait;

/// Outcome of one completed ingestion run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub run_id: String,
    pub source: String,
    pub member_name: String,
    pub trade_date: NaiveDate,
    pub rows_read: usize,
    pub defaulted_rows: usize,
    pub summary: ReconcileSummary,
}

#[async_trait]
pub trait IngestionServiceTrait: Send + Sync {
    /// Runs fetch, extract, parse and reconcile for one archive location.
    async fn ingest(&self, location: &str) -> Result<IngestionReport>;
}

/// Runs the bhavcopy pipeline against a store.
///
/// The trade date recorded with each price point is read from the CSV
/// member name (`EQddmmyy.CSV`); when the name does not carry one the
/// current UTC date is used.
pub struct IngestionService {
    fetcher: Arc<dyn ArchiveFetcher>,
    extractor: Arc<dyn ArchiveExtractor>,
    repository: Arc<dyn StockRepositoryTrait>,
}

impl IngestionService {
    pub fn new(
        fetcher: Arc<dyn ArchiveFetcher>,
        extractor: Arc<dyn ArchiveExtractor>,
        repository: Arc<dyn StockRepositoryTrait>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            repository,
        }
    }
}

#[async_trait]
impl IngestionServiceTrait for IngestionService {
    async fn ingest(&self, location: &str) -> Result<IngestionReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Ingestion run {} started for {}", run_id, location);

        let blob = self.fetcher.fetch(location).await?;
        let member = self.extractor.extract_tabular_member(&blob)?;
        let batch = parse_csv(&member.bytes)?;
        let trade_date = trade_date_from_member_name(&member.name)
            .unwrap_or_else(|| Utc::now().date_naive());

        let summary = reconcile(self.repository.as_ref(), batch.stocks, trade_date)
            .await
            .map_err(|e| {
                error!("Ingestion run {} failed: {}", run_id, e);
                e
            })?;

        info!(
            "Ingestion run {} finished: {} rows, {} inserted, {} updated",
            run_id, batch.rows_read, summary.inserted, summary.updated
        );
        Ok(IngestionReport {
            run_id,
            source: blob.source,
            member_name: member.name,
            trade_date,
            rows_read: batch.rows_read,
            defaulted_rows: batch.defaulted_rows,
            summary,
        })
    }
}
