//! Stockview Core - Domain entities, services, and traits.
//!
//! This crate holds the bhavcopy ingestion pipeline (fetch, extract, parse,
//! reconcile), the TTL query cache and the stock query service.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod cache;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod stocks;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
