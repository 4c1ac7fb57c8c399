//! Cache Store Module
//!
//! The unlocked entry table. Callers wrap it in a mutex; see [`crate::cache::Cache`].

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats};

// == Cache Store ==
/// Key to entry table with a single interval acting as the TTL for every entry.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    interval: Duration,
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store whose entries expire after `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            interval,
            stats: CacheStats::new(),
        }
    }

    /// The interval used both as TTL and sweep period.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Insert ==
    /// Stores a copy of `value` under `key`, stamped with `now`.
    ///
    /// Any previous entry for the key is replaced, value and timestamp alike.
    pub fn insert(&mut self, key: &str, value: &[u8], now: Instant) {
        self.entries.insert(key.to_owned(), CacheEntry::new(value, now));
        self.stats.record_insert();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a copy of the bytes stored under `key`.
    ///
    /// Presence is decided by the table alone. An entry that has outlived the
    /// interval but has not been swept yet is still returned.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Sweep ==
    /// Removes every entry older than the interval as of `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let interval = self.interval;
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(interval, now));
        let removed = before - self.entries.len();

        self.stats.record_sweep(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the store's counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}
