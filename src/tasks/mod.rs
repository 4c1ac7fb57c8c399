//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Sweep: Removes entries older than the cache interval, once per interval

mod sweeper;

pub(crate) use sweeper::spawn_sweep_task;
