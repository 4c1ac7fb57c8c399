//! Pokefetch - fetch catalog API URLs through the response cache
//!
//! Reads one URL per line from stdin and fetches each through the cache,
//! printing where the body came from and its size. Cache statistics are
//! printed as JSON once stdin is exhausted.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokecache::{Cache, CachedFetcher, Config, DisabledCache, ResponseCache};

/// Entry point for the fetcher.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (or the disabled cache) and the fetcher
/// 4. Fetch every URL read from stdin
/// 5. Stop the sweep task and print statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokecache=info,pokefetch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_interval={}ms, cache_disabled={}, http_timeout={}s",
        config.cache_interval_ms, config.cache_disabled, config.http_timeout_secs
    );

    let cache = (!config.cache_disabled).then(|| Cache::new(config.cache_interval()));
    let backend: Arc<dyn ResponseCache> = match &cache {
        Some(cache) => Arc::new(cache.clone()),
        None => Arc::new(DisabledCache),
    };
    let fetcher = CachedFetcher::new(backend, config.http_timeout())
        .context("failed to create HTTP client")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let url = line.trim();
        if url.is_empty() {
            continue;
        }

        match fetcher.get(url).await {
            Ok(fetched) => {
                let source = if fetched.from_cache { "cache" } else { "network" };
                println!("{} {} {}", source, fetched.body.len(), url);
            }
            Err(err) => error!("Error fetching {}: {}", url, err),
        }
    }

    if let Some(cache) = cache {
        cache.shutdown();
        let stats = cache.stats();
        let report = serde_json::json!({
            "hit_rate": stats.hit_rate(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!("Done");
    Ok(())
}
