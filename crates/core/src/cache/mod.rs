//! In-memory query caches.

mod ttl_cache;

pub use ttl_cache::{CacheEntry, TtlCache};
