//! Cache Entry Module
//!
//! Defines the structure for individual cache entries stamped with their insertion time.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single stored response body and the instant it was inserted.
///
/// Entries are never mutated; a put for an existing key replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Owned copy of the stored bytes
    pub value: Vec<u8>,
    /// Insertion time on the runtime's monotonic clock
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry holding a copy of `value`, stamped with `now`.
    pub fn new(value: &[u8], now: Instant) -> Self {
        Self {
            value: value.to_vec(),
            created_at: now,
        }
    }

    // == Age ==
    /// Time elapsed between insertion and `now`.
    ///
    /// Saturates to zero if `now` is earlier than the insertion instant.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    // == Is Expired ==
    /// Checks whether the entry is older than `interval`.
    ///
    /// Boundary condition: an entry whose age equals the interval exactly is
    /// still live. Only a strictly greater age makes it eligible for removal.
    pub fn is_expired(&self, interval: Duration, now: Instant) -> bool {
        self.age(now) > interval
    }
}
