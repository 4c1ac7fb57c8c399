//! Cache Handle Module
//!
//! The shared, lock-guarded cache and the lifetime of its sweep task.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore, ResponseCache, DEFAULT_INTERVAL};
use crate::tasks::spawn_sweep_task;

// == Shared State ==
/// State shared between every [`Cache`] handle and the sweep task.
///
/// The sweep task only holds a weak reference, so dropping the last handle
/// drops this value and aborts the task.
#[derive(Debug)]
pub(crate) struct Shared {
    store: Mutex<CacheStore>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    // Every critical section leaves the table consistent, so a poisoned
    // lock is still safe to use.
    fn store(&self) -> MutexGuard<'_, CacheStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweeper(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.sweeper.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Sweep ==
    /// Runs one sweep pass under the lock. Returns the number of entries removed.
    pub(crate) fn sweep(&self) -> usize {
        let now = Instant::now();
        self.store().sweep(now)
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let handle = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

// == Cache ==
/// Time-expiring, thread-safe response cache.
///
/// Cloning is cheap and every clone refers to the same table. A single
/// background task sweeps the table once per interval and removes entries
/// older than the interval, so an entry may survive up to two intervals
/// before it disappears.
#[derive(Debug, Clone)]
pub struct Cache {
    shared: Arc<Shared>,
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache and starts its sweep task.
    ///
    /// A zero `interval` is replaced by [`DEFAULT_INTERVAL`].
    ///
    /// # Panics
    /// Panics if called outside of a Tokio runtime.
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            interval
        };

        let shared = Arc::new(Shared {
            store: Mutex::new(CacheStore::new(interval)),
            sweeper: Mutex::new(None),
        });

        let handle = spawn_sweep_task(Arc::downgrade(&shared), interval);
        *shared.sweeper() = Some(handle);

        Self { shared }
    }

    // == Put ==
    /// Stores a copy of `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: &str, value: &[u8]) {
        let now = Instant::now();
        self.shared.store().insert(key, value, now);
    }

    // == Get ==
    /// Returns a copy of the bytes stored under `key`, or `None` if absent.
    ///
    /// `None` covers both "never stored" and "already swept"; the two are
    /// deliberately indistinguishable.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.shared.store().get(key)
    }

    /// The interval used both as TTL and sweep period.
    pub fn interval(&self) -> Duration {
        self.shared.store().interval()
    }

    // == Length ==
    /// Returns the current number of entries, including expired entries not yet swept.
    pub fn len(&self) -> usize {
        self.shared.store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.store().is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the cache's counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.store().stats()
    }

    // == Shutdown ==
    /// Stops the sweep task.
    ///
    /// The cache stays usable afterwards but entries are no longer removed.
    /// Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        if let Some(handle) = self.shared.sweeper().take() {
            handle.abort();
            debug!("Cache sweep task stopped");
        }
    }

    /// Returns true while the sweep task is running.
    pub fn is_sweeping(&self) -> bool {
        self.shared
            .sweeper()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl ResponseCache for Cache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        Cache::get(self, key)
    }

    fn put(&self, key: &str, value: &[u8]) {
        Cache::put(self, key, value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;
    use tokio::time::sleep;

    const INTERVAL: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_cache_put_and_get() {
        let cases: [(&str, &[u8]); 2] = [
            ("https://example.com", b"testdata"),
            ("https://example.com/path", b"moretestdata"),
        ];

        for (key, value) in cases {
            let cache = Cache::new(INTERVAL);
            cache.put(key, value);

            assert_eq!(cache.get(key).as_deref(), Some(value));
        }
    }

    #[tokio::test]
    async fn test_cache_miss_on_unknown_key() {
        let cache = Cache::new(INTERVAL);
        assert_eq!(cache.get("https://example.com"), None);
    }

    #[tokio::test]
    async fn test_cache_overwrite() {
        let cache = Cache::new(INTERVAL);

        cache.put("key", b"first");
        cache.put("key", b"second");

        assert_eq!(cache.get("key"), Some(b"second".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_copy_isolation() {
        let cache = Cache::new(INTERVAL);
        let mut original = vec![0x01, 0x02];

        cache.put("key", &original);
        original[0] = 0xff;
        assert_eq!(cache.get("key"), Some(vec![0x01, 0x02]));

        let mut returned = cache.get("key").unwrap();
        returned.push(0x03);
        returned[1] = 0xee;
        assert_eq!(cache.get("key"), Some(vec![0x01, 0x02]));
    }

    #[tokio::test]
    async fn test_clones_share_table() {
        let cache = Cache::new(INTERVAL);
        let other = cache.clone();

        other.put("key", b"value");

        assert_eq!(cache.get("key"), Some(b"value".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_sweep() {
        let cache = Cache::new(Duration::from_millis(5));
        cache.put("A", &[0x01, 0x02]);

        sleep(Duration::from_millis(1)).await;
        assert_eq!(cache.get("A"), Some(vec![0x01, 0x02]));

        sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get("A"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_survives_before_interval() {
        let cache = Cache::new(INTERVAL);
        cache.put("key", b"value");

        // First tick at 5s sees an age of exactly one interval, which is still live
        sleep(Duration::from_millis(5_500)).await;
        assert_eq!(cache.get("key"), Some(b"value".to_vec()));

        // Second tick at 10s removes it
        sleep(Duration::from_millis(5_000)).await;
        assert_eq!(cache.get("key"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_refreshes_timestamp() {
        let cache = Cache::new(INTERVAL);
        cache.put("key", b"first");

        sleep(Duration::from_millis(5_500)).await;
        cache.put("key", b"second");

        // The tick at 10s would remove the original, the refreshed entry is 4.5s old
        sleep(Duration::from_secs(5)).await;
        assert_eq!(cache.get("key"), Some(b"second".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_uses_default() {
        let cache = Cache::new(Duration::ZERO);
        assert_eq!(cache.interval(), DEFAULT_INTERVAL);

        cache.put("key", b"value");
        sleep(Duration::from_millis(500)).await;
        assert_eq!(cache.get("key"), Some(b"value".to_vec()));

        sleep(Duration::from_secs(2)).await;
        assert_eq!(cache.get("key"), None);
        assert!(cache.stats().sweeps >= 2);
    }

    #[tokio::test]
    async fn test_stats_hit_rate() {
        let cache = Cache::new(INTERVAL);
        cache.put("https://example.com", b"testdata");

        cache.get("https://example.com");
        cache.get("https://example.com");
        cache.get("https://example.com");
        cache.get("https://example.com/missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_sweeping() {
        let cache = Cache::new(INTERVAL);
        assert!(cache.is_sweeping());

        cache.put("key", b"value");
        cache.shutdown();
        cache.shutdown();
        assert!(!cache.is_sweeping());

        sleep(INTERVAL * 4).await;
        assert_eq!(cache.get("key"), Some(b"value".to_vec()));
        assert_eq!(cache.stats().sweeps, 0);
    }

    #[tokio::test]
    async fn test_sweep_task_does_not_keep_cache_alive() {
        let cache = Cache::new(Duration::from_millis(1));
        let weak = Arc::downgrade(&cache.shared);

        drop(cache);

        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_in_real_time() {
        let cache = Cache::new(Duration::from_millis(5));
        cache.put("https://example.com", b"testdata");

        assert!(cache.get("https://example.com").is_some());

        sleep(Duration::from_millis(25)).await;
        assert!(cache.get("https://example.com").is_none());
    }

    const WRITERS: usize = 8;
    const READERS: usize = 8;
    const KEYS_PER_WRITER: usize = 200;

    fn concurrent_key(writer: usize, i: usize) -> String {
        format!("https://example.com/{writer}/{i}")
    }

    fn concurrent_value(writer: usize, i: usize) -> Vec<u8> {
        format!("value-{writer}-{i}").into_bytes()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_readers_see_every_write() {
        // Long interval: nothing may expire while the threads run
        let cache = Cache::new(Duration::from_secs(60));
        let barrier = Barrier::new(WRITERS + READERS);

        thread::scope(|scope| {
            for writer in 0..WRITERS {
                let cache = cache.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    for i in 0..KEYS_PER_WRITER {
                        cache.put(&concurrent_key(writer, i), &concurrent_value(writer, i));
                    }
                });
            }

            for _ in 0..READERS {
                let cache = cache.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    for writer in 0..WRITERS {
                        for i in 0..KEYS_PER_WRITER {
                            // Wait for the writer to get here, then check the value
                            let value = loop {
                                match cache.get(&concurrent_key(writer, i)) {
                                    Some(value) => break value,
                                    None => thread::yield_now(),
                                }
                            };
                            assert_eq!(value, concurrent_value(writer, i));
                        }
                    }
                });
            }
        });

        for writer in 0..WRITERS {
            for i in 0..KEYS_PER_WRITER {
                assert_eq!(
                    cache.get(&concurrent_key(writer, i)),
                    Some(concurrent_value(writer, i))
                );
            }
        }

        let stats = cache.stats();
        let total = (WRITERS * KEYS_PER_WRITER) as u64;
        assert_eq!(stats.inserts, total);
        assert_eq!(stats.expired, 0);
        assert!(stats.hits >= total * (READERS as u64 + 1));
        assert_eq!(cache.len(), WRITERS * KEYS_PER_WRITER);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_access_with_fast_sweeper() {
        let cache = Cache::new(Duration::from_millis(1));
        let barrier = Barrier::new(WRITERS + READERS);

        thread::scope(|scope| {
            for writer in 0..WRITERS {
                let cache = cache.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    for i in 0..KEYS_PER_WRITER {
                        cache.put(&concurrent_key(writer, i), &concurrent_value(writer, i));
                    }
                });
            }

            for _ in 0..READERS {
                let cache = cache.clone();
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    for writer in 0..WRITERS {
                        for i in 0..KEYS_PER_WRITER {
                            // Absent means not written yet or already swept
                            if let Some(value) = cache.get(&concurrent_key(writer, i)) {
                                assert_eq!(value, concurrent_value(writer, i));
                            }
                        }
                    }
                });
            }
        });

        let stats = cache.stats();
        assert_eq!(stats.inserts, (WRITERS * KEYS_PER_WRITER) as u64);
        assert_eq!(stats.hits + stats.misses, (READERS * WRITERS * KEYS_PER_WRITER) as u64);
        assert!(cache.len() <= WRITERS * KEYS_PER_WRITER);
    }
}
