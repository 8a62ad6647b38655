//! TTL response caching with LRU eviction.
//!
//! Caches successful backend replies so repeated semantically identical
//! requests skip the network entirely. Failures are never cached.

#![warn(missing_docs)]

mod cache;

pub use cache::{CacheKey, ResponseCache, ResponseCacheConfig, ResponseCacheConfigBuilder};
