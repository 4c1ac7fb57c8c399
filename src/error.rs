//! Error types for fetching through the cache
//!
//! The cache itself never fails; these errors come from the HTTP side of a
//! cache miss and are never stored.

use reqwest::StatusCode;
use thiserror::Error;

// == Fetch Error Enum ==
/// Errors raised while fetching a URL that was not in the cache.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request never produced a response
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status
    #[error("Upstream returned status {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// The response body could not be read
    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

// == Result Type Alias ==
/// Convenience Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
