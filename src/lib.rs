//! Pokecache - A time-expiring response cache for catalog API lookups
//!
//! Keeps response bodies keyed by request URL for a configurable interval so
//! repeated lookups skip the network, with a background task sweeping out
//! entries once they outlive the interval.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
mod tasks;

pub use cache::{Cache, DisabledCache, ResponseCache};
pub use config::Config;
pub use fetch::{CachedFetcher, Fetched};
