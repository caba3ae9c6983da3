//! Cache Module
//!
//! Storage-agnostic cache abstraction with two backends: a remote Redis
//! adapter and an in-process map with TTL expiration.
//!
//! Backends only move text payloads. Typed access goes through [`CacheExt`],
//! which encodes values as JSON on write and decodes into the caller's type
//! on read.

mod entry;
mod key;
mod memory;
mod pattern;
mod redis_cache;


use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, CacheResult};

// Re-export public types
pub use entry::CacheEntry;
pub use key::{entity_key, entity_pattern, route_key, KeyScheme};
pub use memory::MemoryCache;
pub use pattern::{glob_match, KeyPattern};
pub use redis_cache::RedisCache;

// == Cache Trait ==
/// A key-value side store addressed by string keys.
///
/// Every operation may fail with a [`CacheError`]; none of them panic. A key
/// maps to at most one live value, and writing a key replaces both its value
/// and its TTL.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Liveness check. Any connectivity problem yields `false`.
    async fn is_connected(&self) -> bool;

    /// Returns the raw payload stored under `key`.
    async fn get_raw(&self, key: &str) -> CacheResult<String>;

    /// Stores `payload` under `key`. `None` means no expiration.
    async fn set_raw(&self, key: &str, payload: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Removes every key in `keys`. Absent keys are not an error.
    async fn remove(&self, keys: &[String]) -> CacheResult<()>;

    /// Lists keys matching a glob `pattern`. Scans the whole keyspace, keep it
    /// off hot paths.
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Removes every key matching `pattern`.
    ///
    /// This is `keys` followed by `remove` and is not atomic: a key written by
    /// a concurrent writer between the two calls may or may not be removed.
    async fn remove_pattern(&self, pattern: &str) -> CacheResult<()> {
        let keys = self.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(());
        }

        self.remove(&keys).await
    }
}

// == Typed Access ==
/// Typed get/set on top of any [`Cache`].
#[async_trait]
pub trait CacheExt: Cache {
    /// Reads `key` and decodes it into `T`.
    ///
    /// Fails with `ValueCorrupt` when the payload does not fit `T`.
    async fn get<T>(&self, key: &str) -> CacheResult<T>
    where
        T: DeserializeOwned + Send,
    {
        let payload = self.get_raw(key).await?;
        serde_json::from_str(&payload).map_err(|source| CacheError::ValueCorrupt {
            key: key.to_string(),
            source,
        })
    }

    /// Stores `value` without expiration.
    async fn set<T>(&self, key: &str, value: &T) -> CacheResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        self.set_with_expiration(key, value, Duration::ZERO).await
    }

    /// Stores `value` for `ttl`. A zero TTL means no expiration, same as `set`.
    async fn set_with_expiration<T>(&self, key: &str, value: &T, ttl: Duration) -> CacheResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let payload = serde_json::to_string(value).map_err(|source| CacheError::ValueCorrupt {
            key: key.to_string(),
            source,
        })?;
        let ttl = (!ttl.is_zero()).then_some(ttl);

        self.set_raw(key, payload, ttl).await
    }
}

impl<C: Cache + ?Sized> CacheExt for C {}
