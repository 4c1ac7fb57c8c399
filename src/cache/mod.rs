//! Cache Module
//!
//! Provides a time-expiring in-memory cache for response bodies keyed by URL.

use std::time::Duration;

mod disabled;
mod entry;
mod handle;
mod stats;
mod store;


// Re-export public types
pub use disabled::DisabledCache;
pub use entry::CacheEntry;
pub use handle::Cache;
pub(crate) use handle::Shared;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Interval substituted when a cache is created with a zero interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

// == Response Cache ==
/// The get/put capability callers depend on.
///
/// Implemented by [`Cache`] and by [`DisabledCache`] for when caching is off.
/// Both operations copy: `put` never keeps a reference to the caller's
/// buffer and `get` hands out a buffer the caller owns outright.
pub trait ResponseCache: Send + Sync {
    /// Returns a copy of the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores a copy of `value` under `key`, replacing any previous entry.
    fn put(&self, key: &str, value: &[u8]);
}
