//! Cached Fetcher
//!
//! Fetches URLs through a [`ResponseCache`]. The full request URL is the
//! cache key, and only bodies of successful responses are ever stored, so a
//! failed request is retried on the next lookup.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::{FetchError, Result};

/// A response body and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: Vec<u8>,
    /// True when the body was served without a network round-trip
    pub from_cache: bool,
}

/// HTTP GET client that consults a cache before going to the network.
#[derive(Clone)]
pub struct CachedFetcher {
    client: Client,
    cache: Arc<dyn ResponseCache>,
}

impl CachedFetcher {
    /// Creates a fetcher with its own HTTP client using `timeout` per request.
    pub fn new(cache: Arc<dyn ResponseCache>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(client, cache))
    }

    /// Creates a fetcher around an existing HTTP client.
    pub fn with_client(client: Client, cache: Arc<dyn ResponseCache>) -> Self {
        Self { client, cache }
    }

    /// Returns the body for `url`, from the cache when present.
    ///
    /// On a miss the URL is fetched; a 2xx body that was read completely is
    /// stored before returning. Any other outcome is returned as an error
    /// and leaves the cache untouched.
    pub async fn get(&self, url: &str) -> Result<Fetched> {
        if let Some(body) = self.cache.get(url) {
            debug!("Cache hit for {}", url);
            return Ok(Fetched {
                body,
                from_cache: true,
            });
        }

        debug!("Cache miss for {}, fetching", url);
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Upstream returned {} for {}", status, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        self.cache.put(url, &body);

        Ok(Fetched {
            body: body.to_vec(),
            from_cache: false,
        })
    }
}
