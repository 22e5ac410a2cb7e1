//! In-memory TTL cache for lookup payloads.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use geoproxy_core::constants::DEFAULT_MEMORY_CACHE_ENTRIES;
use geoproxy_core::error::Result;
use geoproxy_core::traits::LookupCache;
use geoproxy_core::types::CacheKey;

/// Cache entry with TTL. Never mutated after insertion, only replaced.
#[derive(Clone)]
struct CacheEntry {
    payload: Vec<u8>,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Whether to sweep expired entries before evicting live ones
    pub auto_cleanup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MEMORY_CACHE_ENTRIES,
            auto_cleanup: true,
        }
    }
}

/// In-memory cache for serialized lookup results.
///
/// Thread-safe and supports TTL-based expiration. Keys are stored exactly as
/// given; the proxy has already namespaced them.
pub struct MemoryLookupCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
}

impl MemoryLookupCache {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Returns the payload under `key` unless missing or expired.
    pub fn get_payload(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read();
        entries.get(key).and_then(|e| {
            if e.is_expired() {
                None
            } else {
                Some(e.payload.clone())
            }
        })
    }

    /// Stores `payload` under `key` for `ttl`, replacing any previous entry.
    pub fn set_payload(&self, key: &str, payload: Vec<u8>, ttl: Duration) {
        let mut entries = self.entries.write();

        if !entries.contains_key(key) {
            if self.config.auto_cleanup && entries.len() >= self.config.max_entries {
                entries.retain(|_, e| !e.is_expired());
            }
            if entries.len() >= self.config.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest_key);
                }
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Removes a cached entry.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of cached entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired()).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: self.config.max_entries,
        }
    }
}

impl Default for MemoryLookupCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LookupCache for MemoryLookupCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        Ok(self.get_payload(key.as_str()))
    }

    async fn set(&self, key: &CacheKey, payload: Vec<u8>, ttl: Duration) -> Result<()> {
        self.set_payload(key.as_str(), payload, ttl);
        Ok(())
    }
}

/// Cache statistics.
#[derive(Clone, Debug)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoproxy_core::types::LookupRequest;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_cache_set_get() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("search:Moscow", b"[1]".to_vec(), HOUR);
        assert_eq!(cache.get_payload("search:Moscow").unwrap(), b"[1]".to_vec());
    }

    #[test]
    fn test_cache_keys_are_verbatim() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("search:Moscow", b"[1]".to_vec(), HOUR);

        assert!(cache.get_payload("search:moscow").is_none());
        assert!(cache.get_payload(" search:Moscow").is_none());
    }

    #[test]
    fn test_cache_miss() {
        let cache = MemoryLookupCache::new();
        assert!(cache.get_payload("search:nowhere").is_none());
    }

    #[test]
    fn test_cache_overwrite_replaces_entry() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("k", b"old".to_vec(), HOUR);
        cache.set_payload("k", b"new".to_vec(), HOUR);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_payload("k").unwrap(), b"new".to_vec());
    }

    #[test]
    fn test_cache_remove() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("k", b"x".to_vec(), HOUR);
        cache.remove("k");
        assert!(cache.get_payload("k").is_none());
    }

    #[test]
    fn test_cache_clear() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("a", b"x".to_vec(), HOUR);
        cache.set_payload("b", b"x".to_vec(), HOUR);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_ttl_expiration() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("k", b"x".to_vec(), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get_payload("k").is_none());
    }

    #[test]
    fn test_cache_zero_ttl_never_hits() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("k", b"x".to_vec(), Duration::ZERO);
        assert!(cache.get_payload("k").is_none());
    }

    #[test]
    fn test_cache_capacity_eviction() {
        let config = CacheConfig {
            max_entries: 2,
            auto_cleanup: true,
        };
        let cache = MemoryLookupCache::with_config(config);
        cache.set_payload("a", b"x".to_vec(), HOUR);
        std::thread::sleep(Duration::from_millis(2));
        cache.set_payload("b", b"x".to_vec(), HOUR);
        cache.set_payload("c", b"x".to_vec(), HOUR);

        assert_eq!(cache.len(), 2);
        assert!(cache.get_payload("a").is_none());
        assert!(cache.get_payload("c").is_some());
    }

    #[test]
    fn test_cache_capacity_prefers_expired() {
        let config = CacheConfig {
            max_entries: 2,
            auto_cleanup: true,
        };
        let cache = MemoryLookupCache::with_config(config);
        cache.set_payload("live", b"x".to_vec(), HOUR);
        cache.set_payload("stale", b"x".to_vec(), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));
        cache.set_payload("fresh", b"x".to_vec(), HOUR);

        assert!(cache.get_payload("live").is_some());
        assert!(cache.get_payload("fresh").is_some());
    }

    #[test]
    fn test_cache_stats() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("a", b"x".to_vec(), HOUR);
        cache.set_payload("b", b"x".to_vec(), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);
    }

    #[test]
    fn test_cache_cleanup_expired() {
        let cache = MemoryLookupCache::new();
        cache.set_payload("a", b"x".to_vec(), Duration::from_millis(1));
        cache.set_payload("b", b"x".to_vec(), HOUR);
        std::thread::sleep(Duration::from_millis(10));
        cache.cleanup_expired();
        assert_eq!(cache.len(), 1);
        assert!(cache.get_payload("b").is_some());
    }

    #[tokio::test]
    async fn test_lookup_cache_trait() {
        let cache = MemoryLookupCache::new();
        let key = LookupRequest::coordinates("55.76", "37.60").cache_key();

        assert!(LookupCache::get(&cache, &key).await.unwrap().is_none());
        LookupCache::set(&cache, &key, b"payload".to_vec(), HOUR).await.unwrap();
        assert_eq!(
            LookupCache::get(&cache, &key).await.unwrap(),
            Some(b"payload".to_vec())
        );
        assert_eq!(cache.get_payload("geocode:55.76:37.60"), Some(b"payload".to_vec()));
    }
}
