//! Configuration Module
//!
//! Handles loading cache and HTTP client settings from environment variables.

use std::env;
use std::time::Duration;

/// Fetcher configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache entry lifetime and sweep period in milliseconds
    pub cache_interval_ms: u64,
    /// When true, every lookup goes to the network
    pub cache_disabled: bool,
    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `POKECACHE_INTERVAL_MS` - Cache interval in milliseconds (default: 5000);
    ///   zero or negative values select the cache's default interval
    /// - `POKECACHE_DISABLED` - `1` or `true` turns caching off (default: false)
    /// - `POKECACHE_HTTP_TIMEOUT_SECS` - HTTP request timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_interval_ms: env::var("POKECACHE_INTERVAL_MS")
                .ok()
                .and_then(|v| parse_interval_ms(&v))
                .unwrap_or(defaults.cache_interval_ms),
            cache_disabled: env::var("POKECACHE_DISABLED")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.cache_disabled),
            http_timeout_secs: env::var("POKECACHE_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
        }
    }

    pub fn cache_interval(&self) -> Duration {
        Duration::from_millis(self.cache_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Parses a millisecond count, clamping negative values to zero.
///
/// A zero interval makes [`crate::Cache::new`] fall back to its default.
fn parse_interval_ms(value: &str) -> Option<u64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .map(|ms| u64::try_from(ms).unwrap_or(0))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_interval_ms: 5000,
            cache_disabled: false,
            http_timeout_secs: 30,
        }
    }
}
