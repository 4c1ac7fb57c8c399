//! Disabled Cache Module
//!
//! A cache that stores nothing, for running with caching turned off.

use crate::cache::ResponseCache;

// == Disabled Cache ==
/// Always misses and silently drops every put.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

impl ResponseCache for DisabledCache {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn put(&self, _key: &str, _value: &[u8]) {}
}
