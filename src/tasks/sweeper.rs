//! Cache Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::cache::Shared;

/// Spawns the task that sweeps `cache` once per `interval`.
///
/// The first sweep happens one full interval after the call. Each sweep
/// takes the cache lock, removes every entry older than `interval` and
/// releases the lock before waiting for the next tick.
///
/// The task holds only a weak reference and exits on the first tick after
/// the cache has been dropped. The returned handle can abort it earlier.
pub(crate) fn spawn_sweep_task(cache: Weak<Shared>, interval: Duration) -> JoinHandle<()> {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            ticker.tick().await;

            let Some(shared) = cache.upgrade() else {
                debug!("Cache dropped, stopping sweep task");
                break;
            };
            let removed = shared.sweep();
            drop(shared);

            if removed > 0 {
                debug!("Cache sweep: removed {} expired entries", removed);
            } else {
                trace!("Cache sweep: no expired entries found");
            }
        }
    })
}
