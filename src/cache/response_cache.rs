//! Response caching with per-category lifetimes.
//!
//! The cache stores decoded JSON payloads keyed by logical query. It is an
//! injected abstraction so the client can run against an in-memory fake in
//! tests or be backed by something shared in an application. Concurrent
//! misses on the same key may each fetch (at-most-once per call, not
//! single-flight); correctness only requires that reads never observe an
//! expired entry.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Cache lifetimes per dataset category.
///
/// The station inventory barely changes, near-real-time observations go
/// stale within the hour, and climatological datasets are historical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    /// Station inventory. Default 24 hours.
    pub stations: Duration,
    /// Recent observations, whole-network or per-station. Default 1 hour.
    pub recent_observations: Duration,
    /// Daily climate series and climate normals. Default 7 days.
    pub climatology: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            stations: Duration::from_secs(24 * 60 * 60),
            recent_observations: Duration::from_secs(60 * 60),
            climatology: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Key-value store for decoded payloads with per-entry expiry.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the payload for `key` if present and not expired.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Stores `payload` under `key`, expiring `ttl` from now.
    async fn set(&self, key: &str, payload: Value, ttl: Duration);
}

#[derive(Debug)]
struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

/// Default in-process cache. Expired entries are evicted lazily on read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, payload: Value, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn stores_and_returns_within_ttl() {
        let cache = MemoryCache::new();
        cache
            .set("stations:all", json!([{"idema": "3195"}]), Duration::from_secs(60))
            .await;
        assert_eq!(
            cache.get("stations:all").await,
            Some(json!([{"idema": "3195"}]))
        );
    }

    #[tokio::test]
    async fn expired_entries_are_never_returned() {
        let cache = MemoryCache::new();
        cache
            .set("observations:recent", json!([]), Duration::ZERO)
            .await;
        assert_eq!(cache.get("observations:recent").await, None);
        // The expired entry was evicted, not just hidden.
        assert!(cache.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn distinct_keys_do_not_collide() {
        let cache = MemoryCache::new();
        cache
            .set("climate:normals:3195", json!(1), Duration::from_secs(60))
            .await;
        cache
            .set("climate:normals:0201D", json!(2), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("climate:normals:3195").await, Some(json!(1)));
        assert_eq!(cache.get("climate:normals:0201D").await, Some(json!(2)));
        assert_eq!(cache.get("climate:normals:9999").await, None);
    }
}
