//! Bhavcopy ingestion: download, decompress, parse and reconcile.

pub mod extractor;
pub mod fetcher;
pub mod parser;
pub mod reconciler;
mod ingestion_service;

pub use extractor::{ArchiveExtractor, TabularMember, ZipCsvExtractor};
pub use fetcher::{bhavcopy_url, ArchiveBlob, ArchiveFetcher, HttpArchiveFetcher, LocalArchiveFetcher};
pub use ingestion_service::{IngestionReport, IngestionService, IngestionServiceTrait};
pub use parser::{parse_csv, parse_row, trade_date_from_member_name, ParsedBatch, ParsedRow};
pub use reconciler::{reconcile, ReconcileError, ReconcileSummary};
