//! `src/cache/prefix_cache.rs`
//! ============================================================================
//! # Prefix Cache
//!
//! Maps a normalized directory prefix to the entries enumerated beneath it.
//! - One `parking_lot::Mutex` guards the whole map
//! - No eviction: entries live until invalidated
//! - Hit/miss/insert counters for diagnostics

use std::{
    fmt,
    path::MAIN_SEPARATOR,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use ahash::RandomState;
use hashbrown::HashMap;
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::{
    completion::query::{is_separator, native_separators},
    model::entry::Entry,
};

/// Normalized cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// "Enumerate available drives/roots"
    Roots,

    /// Directory prefix, always ending in a separator
    Dir(Arc<str>),
}

impl CacheKey {
    /// Normalize a directory prefix. Case is folded unless
    /// `case_sensitive`; a trailing separator is enforced.
    #[must_use]
    pub fn from_prefix(prefix: &str, case_sensitive: bool) -> Self {
        if prefix.is_empty() {
            return Self::Roots;
        }

        let mut key: String = native_separators(prefix);

        if !case_sensitive {
            key = key.to_lowercase();
        }

        if !key.ends_with(is_separator) {
            key.push(MAIN_SEPARATOR);
        }

        Self::Dir(Arc::from(key))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roots => f.write_str("<roots>"),
            Self::Dir(path) => f.write_str(path),
        }
    }
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_invalidation(&self, count: u64) {
        self.invalidations.fetch_add(count, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub invalidations: u64,
}

impl CacheStatsSnapshot {
    #[expect(clippy::cast_precision_loss, reason = "Expected precision loss")]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe prefix → entries map; clones share state.
#[derive(Clone, Default)]
pub struct PrefixCache {
    inner: Arc<Mutex<HashMap<CacheKey, Arc<[Entry]>, RandomState>>>,
    stats: Arc<CacheStats>,
}

impl PrefixCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self), fields(cache_key = %key))]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<[Entry]>> {
        let result = self.inner.lock().get(key).cloned();

        match &result {
            Some(entries) => {
                self.stats.record_hit();
                debug!(
                    marker = "CACHE_OPERATION",
                    operation_type = "cache_hit",
                    cache_key = %key,
                    entry_count = entries.len(),
                    "Cache hit"
                );
            }
            None => {
                self.stats.record_miss();
                debug!(
                    marker = "CACHE_OPERATION",
                    operation_type = "cache_miss",
                    cache_key = %key,
                    "Cache miss - key not found"
                );
            }
        }

        result
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Store a completed enumeration. Last writer wins.
    pub fn insert(&self, key: CacheKey, entries: Arc<[Entry]>) {
        let count = entries.len();
        let replaced = self.inner.lock().insert(key.clone(), entries).is_some();
        self.stats.record_insert();

        debug!(
            marker = "CACHE_OPERATION",
            operation_type = "cache_insert",
            cache_key = %key,
            entry_count = count,
            replaced,
            "Inserted entries into cache"
        );
    }

    /// Drop one key; returns whether it was present.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.inner.lock().remove(key).is_some();
        if removed {
            self.stats.record_invalidation(1);
        }

        debug!(
            marker = "CACHE_OPERATION",
            operation_type = "cache_invalidate",
            cache_key = %key,
            removed,
            "Invalidated cache key"
        );

        removed
    }

    pub fn clear(&self) {
        let mut map = self.inner.lock();
        let count = map.len() as u64;
        map.clear();
        drop(map);

        self.stats.record_invalidation(count);
        info!(removed = count, "Cache cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}

// Manual Debug keeps the entry lists out of log output.
impl fmt::Debug for PrefixCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixCache")
            .field("entry_count", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}
