//! In-Memory Cache Backend
//!
//! Process-local `Cache` implementation backed by a HashMap. Expired entries
//! are treated as absent on read and removed lazily, or in bulk by
//! [`MemoryCache::purge_expired`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{Cache, CacheEntry, KeyPattern};
use crate::error::{CacheError, CacheResult};

// == Memory Cache ==
/// Shared in-process cache. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    /// Remaining TTL of `key` in milliseconds, `None` when absent or without
    /// expiration.
    pub async fn ttl_remaining_ms(&self, key: &str) -> Option<u64> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .and_then(CacheEntry::ttl_remaining_ms)
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn is_connected(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(entry.value.clone()),
                Some(_) => {}
                None => return Err(CacheError::KeyNotFound(key.to_string())),
            }
        }

        // Expired: drop it unless a writer replaced it in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
            trace!(key, "evicted expired entry");
        }
        Err(CacheError::KeyNotFound(key.to_string()))
    }

    async fn set_raw(&self, key: &str, payload: String, ttl: Option<Duration>) -> CacheResult<()> {
        let entry = CacheEntry::new(payload, ttl.filter(|ttl| !ttl.is_zero()));
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let pattern = KeyPattern::new(pattern);
        let now = current_timestamp_ms();
        let entries = self.entries.read().await;

        Ok(entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired_at(now) && pattern.matches(key))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
