//! SQLite storage implementation for Stockview.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `stockview-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The stock repository and its database model types
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The `core` crate is database-agnostic and works with traits.
//!
//! ```text
//!     core (domain, ingestion)
//!              │
//!              ▼
//!     storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! Reads use the r2d2 pool directly. Writes go through a single writer task
//! (`db::write_actor`) so SQLite never sees two concurrent writers.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod stocks;

// Re-export database utilities
pub use db::{
    create_pool, create_pool_with_timeout, get_connection, init, run_migrations, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from stockview-core for convenience
pub use stockview_core::errors::{DatabaseError, Error, Result};
