//! Keyed TTL cache used in front of slow store reads.
//!
//! Entries are checked for freshness on every read and are never evicted in
//! the background. An expired entry stays in the map until the next `set`
//! for the same key overwrites it.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

/// A cached value together with the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub expires_at: Instant,
    pub value: V,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Reader/writer locked map of cache entries.
///
/// Lookups take the shared lock, so concurrent readers do not block each
/// other. Writes take the exclusive lock.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the value if present and not yet expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.read()
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key` until `now + ttl`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            expires_at: Instant::now() + ttl,
            value,
        };
        self.write().insert(key.into(), entry);
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Entries are plain values, so a panic while holding the lock cannot leave
    // one half-written. Recover the guard instead of propagating the poison.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_returns_value_within_ttl() {
        let cache = TtlCache::new();
        cache.set("500325", vec![1.0, 2.0], Duration::from_secs(60));
        assert_eq!(cache.get("500325"), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn test_get_missing_key() {
        let cache: TtlCache<u32> = TtlCache::new();
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let cache = TtlCache::new();
        cache.set("k", 1u32, Duration::ZERO);
        assert_eq!(cache.get("k"), None);
        // Expired entries are kept until overwritten
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), Duration::from_millis(20));
        assert!(cache.get("k").is_some());
        thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_set_overwrites_and_extends() {
        let cache = TtlCache::new();
        cache.set("k", 1u32, Duration::ZERO);
        cache.set("k", 2u32, Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(TtlCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..100 {
                        let key = format!("k{}", j % 10);
                        cache.set(key.clone(), i * 1000 + j, Duration::from_secs(60));
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}
