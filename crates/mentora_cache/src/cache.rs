//! Response cache implementation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cache key derived from the semantically relevant request fields.
///
/// The key is a SHA-256 digest over an operation label and the request
/// fields that determine the reply. Incidental fields (timestamps,
/// session ids, personalization blobs) must be left out of `parts` so
/// equivalent requests collide onto the same slot.
///
/// # Examples
///
/// ```
/// use mentora_cache::CacheKey;
///
/// let a = CacheKey::new("tutor.ask", &["what is gravity?", "physics"]);
/// let b = CacheKey::new("tutor.ask", &["what is gravity?", "physics"]);
/// let c = CacheKey::new("tutor.ask", &["what is gravity?", ""]);
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: String,
    digest: [u8; 32],
}

impl CacheKey {
    /// Derive a key from an operation label and its semantic fields.
    pub fn new(operation: &str, parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(operation.as_bytes());
        for part in parts {
            // Separator prevents ["ab","c"] and ["a","bc"] from colliding.
            hasher.update([0x1f]);
            hasher.update(part.as_bytes());
        }
        Self {
            operation: operation.to_string(),
            digest: hasher.finalize().into(),
        }
    }

    /// The operation label this key belongs to.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Short hex prefix of the digest, stable across runs.
    ///
    /// Useful as a deterministic identifier for locally synthesized
    /// content tied to one request.
    pub fn short_hex(&self) -> String {
        self.digest[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Cache entry with value and expiration.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// An entry is live strictly inside its TTL window.
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Configuration for a response cache.
#[derive(
    Debug, Clone, Serialize, Deserialize, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct ResponseCacheConfig {
    /// Default TTL for cached entries (seconds)
    #[serde(default = "default_ttl")]
    pub default_ttl: u64,

    /// Maximum cache size (number of entries)
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_ttl() -> u64 {
    600 // 10 minutes
}

fn default_max_size() -> usize {
    500
}

fn default_enabled() -> bool {
    true
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_ttl(),
            max_size: default_max_size(),
            enabled: default_enabled(),
        }
    }
}

/// TTL-bounded cache of successful backend replies.
///
/// Entries expire `ttl` after insertion; an expired entry behaves exactly
/// like an absent one and is evicted lazily. When the cache is full, the
/// least recently used entry makes room.
///
/// # Example
///
/// ```
/// use mentora_cache::{CacheKey, ResponseCache, ResponseCacheConfig};
///
/// let mut cache: ResponseCache<String> = ResponseCache::new(ResponseCacheConfig::default());
/// let key = CacheKey::new("quiz.generate", &["algebra", "medium", "5", "mcq"]);
///
/// cache.insert(key.clone(), "cached quiz".to_string(), None);
/// assert_eq!(cache.get(&key), Some("cached quiz".to_string()));
/// ```
pub struct ResponseCache<T> {
    config: ResponseCacheConfig,
    entries: HashMap<CacheKey, CacheEntry<T>>,
    access_order: Vec<CacheKey>,
}

impl<T: Clone> ResponseCache<T> {
    /// Create a new response cache with configuration.
    pub fn new(config: ResponseCacheConfig) -> Self {
        tracing::debug!(
            default_ttl = config.default_ttl,
            max_size = config.max_size,
            enabled = config.enabled,
            "Creating new ResponseCache"
        );
        Self {
            config,
            entries: HashMap::new(),
            access_order: Vec::new(),
        }
    }

    /// Insert a reply into the cache.
    ///
    /// `ttl` falls back to the configured default when `None`. Inserting
    /// over an existing slot (live or expired) replaces it.
    pub fn insert(&mut self, key: CacheKey, value: T, ttl: Option<Duration>) {
        if !self.config.enabled {
            return;
        }

        let ttl = ttl.unwrap_or(Duration::from_secs(self.config.default_ttl));

        // Evict if at capacity
        if self.entries.len() >= self.config.max_size && !self.entries.contains_key(&key) {
            self.evict_lru();
        }

        // Track access order for LRU
        if let Some(pos) = self.access_order.iter().position(|k| k == &key) {
            self.access_order.remove(pos);
        }
        self.access_order.push(key.clone());

        tracing::debug!(
            operation = key.operation(),
            key = %key.short_hex(),
            ttl = ?ttl,
            cache_size = self.entries.len(),
            "Inserted entry into cache"
        );

        self.entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Get a cached reply.
    ///
    /// Returns None if the entry doesn't exist, has expired, or the cache
    /// is disabled. Expired entries are removed on the way out.
    pub fn get(&mut self, key: &CacheKey) -> Option<T> {
        if !self.config.enabled {
            return None;
        }

        let entry = self.entries.get(key)?;
        if entry.is_expired() {
            tracing::debug!(
                operation = key.operation(),
                key = %key.short_hex(),
                "Cache entry expired, removing"
            );
            self.entries.remove(key);
            if let Some(pos) = self.access_order.iter().position(|k| k == key) {
                self.access_order.remove(pos);
            }
            return None;
        }

        // Update access order for LRU
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            let key_clone = self.access_order.remove(pos);
            self.access_order.push(key_clone);
        }

        tracing::debug!(
            operation = key.operation(),
            key = %key.short_hex(),
            "Cache hit"
        );

        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Remove expired entries from the cache.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();

        self.entries.retain(|key, entry| {
            let keep = !entry.is_expired();
            if !keep
                && let Some(pos) = self.access_order.iter().position(|k| k == key)
            {
                self.access_order.remove(pos);
            }
            keep
        });

        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::info!(
                removed,
                remaining = self.entries.len(),
                "Cleaned up expired cache entries"
            );
        }
        removed
    }

    /// Clear all cache entries.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.access_order.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Get number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evict least recently used entry.
    fn evict_lru(&mut self) {
        if let Some(key) = self.access_order.first().cloned() {
            tracing::debug!(
                operation = key.operation(),
                key = %key.short_hex(),
                "Evicting LRU entry"
            );
            self.entries.remove(&key);
            self.access_order.remove(0);
        }
    }
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new(ResponseCacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn expired_entries_behave_as_absent() {
        let mut cache: ResponseCache<u32> = ResponseCache::default();
        let key = CacheKey::new("test", &["a"]);

        cache.insert(key.clone(), 7, Some(Duration::from_millis(20)));
        assert_eq!(cache.get(&key), Some(7));

        sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&key), None);
        // The stale slot was removed, not left to error later.
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_overwrites_stale_slot() {
        let mut cache: ResponseCache<u32> = ResponseCache::default();
        let key = CacheKey::new("test", &["a"]);

        cache.insert(key.clone(), 1, Some(Duration::from_millis(10)));
        sleep(Duration::from_millis(20));
        cache.insert(key.clone(), 2, Some(Duration::from_secs(60)));
        assert_eq!(cache.get(&key), Some(2));
    }

    #[test]
    fn lru_entry_is_evicted_at_capacity() {
        let config = ResponseCacheConfig::default()
            .with_max_size(2)
            .with_default_ttl(60);
        let mut cache: ResponseCache<u32> = ResponseCache::new(config);
        let a = CacheKey::new("test", &["a"]);
        let b = CacheKey::new("test", &["b"]);
        let c = CacheKey::new("test", &["c"]);

        cache.insert(a.clone(), 1, None);
        cache.insert(b.clone(), 2, None);
        // Touch `a` so `b` becomes least recently used.
        assert_eq!(cache.get(&a), Some(1));
        cache.insert(c.clone(), 3, None);

        assert_eq!(cache.get(&b), None);
        assert_eq!(cache.get(&a), Some(1));
        assert_eq!(cache.get(&c), Some(3));
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let config = ResponseCacheConfig::default().with_enabled(false);
        let mut cache: ResponseCache<u32> = ResponseCache::new(config);
        let key = CacheKey::new("test", &["a"]);

        cache.insert(key.clone(), 1, None);
        assert_eq!(cache.get(&key), None);
    }

    #[test]
    fn key_separator_prevents_field_bleed() {
        let a = CacheKey::new("op", &["ab", "c"]);
        let b = CacheKey::new("op", &["a", "bc"]);
        assert_ne!(a, b);
    }
}
