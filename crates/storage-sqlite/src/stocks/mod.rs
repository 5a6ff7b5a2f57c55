//! SQLite storage implementation for stocks and their price history.

mod model;
mod repository;

pub use model::{PricePointDB, StockDB};
pub use repository::StockRepository;
