//! Restaurant business logic
//!
//! `GetRestaurantBiz` serves single-restaurant lookups cache-first:
//!
//! 1. read the cache; a hit is returned as-is
//! 2. any cache error counts as a miss and falls through to the store
//! 3. store "record not found" becomes `EntityNotFound`, any other store
//!    failure `EntityUnavailable`
//! 4. a soft-deleted record fails with `EntityDeleted` and is never cached
//! 5. a live record is cached with the configured TTL, best effort
//!
//! There is no retry and no locking. Concurrent misses on one key may all reach
//! the store and all write the cache; the last write wins.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::model::{Restaurant, RestaurantCreate, ENTITY_NAME};
use super::store::{
    Conditions, CreateRestaurantStore, FindRestaurantStore, SoftDeleteRestaurantStore, StoreError,
};
use crate::cache::{Cache, CacheExt};
use crate::error::{AppError, CacheError, Result};

fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::RecordNotFound => AppError::EntityNotFound {
            entity: ENTITY_NAME.to_string(),
        },
        other => AppError::EntityUnavailable {
            entity: ENTITY_NAME.to_string(),
            source: Box::new(other),
        },
    }
}

fn entity_deleted() -> AppError {
    AppError::EntityDeleted {
        entity: ENTITY_NAME.to_string(),
    }
}

// == Get ==
pub struct GetRestaurantBiz<'a, S: ?Sized> {
    store: &'a S,
    ttl: Duration,
}

impl<'a, S> GetRestaurantBiz<'a, S>
where
    S: FindRestaurantStore + ?Sized,
{
    /// `ttl` applies to entries this lookup writes into the cache.
    pub fn new(store: &'a S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Looks up restaurant `id`, using `key` as its cache slot.
    pub async fn get_restaurant(&self, cache: &dyn Cache, key: &str, id: i64) -> Result<Restaurant> {
        match cache.get::<Restaurant>(key).await {
            // Hits are trusted without re-checking the status
            Ok(cached) => {
                debug!(key, id, "cache hit");
                return Ok(cached);
            }
            Err(CacheError::KeyNotFound(_)) => debug!(key, id, "cache miss"),
            Err(err) => warn!(key, id, error = %err, "cache read failed, falling back to store"),
        }

        let restaurant = self
            .store
            .find_restaurant_by_id(&Conditions::id(id), &[])
            .await
            .map_err(store_error)?;

        if restaurant.is_deleted() {
            return Err(entity_deleted());
        }

        if let Err(err) = cache.set_with_expiration(key, &restaurant, self.ttl).await {
            warn!(key, id, error = %err, "cache population failed");
        }

        Ok(restaurant)
    }
}

// == Create ==
pub struct CreateRestaurantBiz<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> CreateRestaurantBiz<'a, S>
where
    S: CreateRestaurantStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validates and stores a new restaurant, returning its id. The cache is
    /// left untouched: entries only appear after a store read.
    pub async fn create_restaurant(&self, data: &RestaurantCreate) -> Result<i64> {
        if let Some(message) = data.validate() {
            return Err(AppError::InvalidRequest(message));
        }

        let id = self
            .store
            .create(data)
            .await
            .map_err(|err| AppError::Internal(err.to_string()))?;
        info!(id, "restaurant created");
        Ok(id)
    }
}

// == Delete ==
pub struct DeleteRestaurantBiz<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> DeleteRestaurantBiz<'a, S>
where
    S: FindRestaurantStore + SoftDeleteRestaurantStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Soft deletes restaurant `id`, then drops `key` from the cache so later
    /// lookups stop serving the live copy.
    pub async fn delete_restaurant(&self, cache: &dyn Cache, key: &str, id: i64) -> Result<()> {
        let conditions = Conditions::id(id);

        let current = self
            .store
            .find_restaurant_by_id(&conditions, &[])
            .await
            .map_err(store_error)?;
        if current.is_deleted() {
            return Err(entity_deleted());
        }

        self.store.soft_delete(&conditions).await.map_err(store_error)?;
        info!(id, "restaurant soft deleted");

        if let Err(err) = cache.remove(&[key.to_string()]).await {
            warn!(key, id, error = %err, "cache invalidation failed, entry lives until its TTL");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{entity_key, MemoryCache};
    use crate::error::CacheResult;
    use crate::restaurant::model::{STATUS_ACTIVE, STATUS_DELETED};
    use crate::restaurant::store::{MemoryRestaurantStore, StoreResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(300);

    fn restaurant(id: i64, status: i32) -> Restaurant {
        Restaurant {
            id,
            name: "Pho".to_string(),
            addr: String::new(),
            status,
            created_at: None,
            updated_at: None,
        }
    }

    /// Wraps the memory store and counts lookups.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryRestaurantStore,
        finds: AtomicUsize,
    }

    impl CountingStore {
        async fn with(rows: Vec<Restaurant>) -> Self {
            let store = Self::default();
            for row in rows {
                store.inner.insert(row).await;
            }
            store
        }

        fn finds(&self) -> usize {
            self.finds.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FindRestaurantStore for CountingStore {
        async fn find_restaurant_by_id(
            &self,
            conditions: &Conditions,
            more_keys: &[&str],
        ) -> StoreResult<Restaurant> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find_restaurant_by_id(conditions, more_keys).await
        }
    }

    #[async_trait]
    impl SoftDeleteRestaurantStore for CountingStore {
        async fn soft_delete(&self, conditions: &Conditions) -> StoreResult<()> {
            self.inner.soft_delete(conditions).await
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl FindRestaurantStore for BrokenStore {
        async fn find_restaurant_by_id(&self, _: &Conditions, _: &[&str]) -> StoreResult<Restaurant> {
            Err(StoreError::Backend("connection refused".to_string()))
        }
    }

    /// A cache whose backend is always down.
    struct DownCache;

    #[async_trait]
    impl Cache for DownCache {
        async fn is_connected(&self) -> bool {
            false
        }

        async fn get_raw(&self, _: &str) -> CacheResult<String> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        async fn set_raw(&self, _: &str, _: String, _: Option<Duration>) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        async fn remove(&self, _: &[String]) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        async fn keys(&self, _: &str) -> CacheResult<Vec<String>> {
            Err(CacheError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_live_entity_is_returned_and_cached() {
        let store = CountingStore::with(vec![restaurant(1, STATUS_ACTIVE)]).await;
        let cache = MemoryCache::new();
        let key = entity_key(ENTITY_NAME, 1);

        let found = GetRestaurantBiz::new(&store, TTL)
            .get_restaurant(&cache, &key, 1)
            .await
            .unwrap();

        assert_eq!(found, restaurant(1, STATUS_ACTIVE));
        let cached: Restaurant = cache.get(&key).await.unwrap();
        assert_eq!(cached, found);
        let remaining = cache.ttl_remaining_ms(&key).await.unwrap();
        assert!(remaining > 299_000 && remaining <= 300_000);
    }

    #[tokio::test]
    async fn test_second_lookup_skips_store() {
        let store = CountingStore::with(vec![restaurant(1, STATUS_ACTIVE)]).await;
        let cache = MemoryCache::new();
        let biz = GetRestaurantBiz::new(&store, TTL);

        let first = biz.get_restaurant(&cache, "restaurant:1", 1).await.unwrap();
        let second = biz.get_restaurant(&cache, "restaurant:1", 1).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.finds(), 1);
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_found_and_not_cached() {
        let store = CountingStore::with(vec![]).await;
        let cache = MemoryCache::new();

        let result = GetRestaurantBiz::new(&store, TTL)
            .get_restaurant(&cache, "restaurant:999", 999)
            .await;

        assert!(matches!(result, Err(AppError::EntityNotFound { .. })));
        assert!(cache.keys("restaurant:999").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_entity_is_rejected_and_not_cached() {
        let store = CountingStore::with(vec![restaurant(2, STATUS_DELETED)]).await;
        let cache = MemoryCache::new();

        let result = GetRestaurantBiz::new(&store, TTL)
            .get_restaurant(&cache, "restaurant:2", 2)
            .await;

        assert!(matches!(result, Err(AppError::EntityDeleted { .. })));
        assert!(cache.keys("restaurant:*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_unavailable() {
        let cache = MemoryCache::new();

        let result = GetRestaurantBiz::new(&BrokenStore, TTL)
            .get_restaurant(&cache, "restaurant:1", 1)
            .await;

        match result {
            Err(AppError::EntityUnavailable { source, .. }) => {
                assert!(source.to_string().contains("connection refused"));
            }
            other => panic!("expected EntityUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_back_to_store() {
        let store = CountingStore::with(vec![restaurant(1, STATUS_ACTIVE)]).await;
        let cache = MemoryCache::new();
        cache.set("restaurant:1", "not a restaurant").await.unwrap();

        let found = GetRestaurantBiz::new(&store, TTL)
            .get_restaurant(&cache, "restaurant:1", 1)
            .await
            .unwrap();

        assert_eq!(found.id, 1);
        assert_eq!(store.finds(), 1);
        // Repopulated with a readable copy
        assert_eq!(cache.get::<Restaurant>("restaurant:1").await.unwrap(), found);
    }

    #[tokio::test]
    async fn test_unavailable_cache_is_absorbed() {
        let store = CountingStore::with(vec![restaurant(1, STATUS_ACTIVE)]).await;
        let biz = GetRestaurantBiz::new(&store, TTL);

        let first = biz.get_restaurant(&DownCache, "restaurant:1", 1).await.unwrap();
        let second = biz.get_restaurant(&DownCache, "restaurant:1", 1).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.finds(), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_is_trusted_until_invalidated() {
        let store = CountingStore::with(vec![restaurant(1, STATUS_ACTIVE)]).await;
        let cache = MemoryCache::new();
        let biz = GetRestaurantBiz::new(&store, TTL);
        biz.get_restaurant(&cache, "restaurant:1", 1).await.unwrap();

        // Deleted behind the cache's back: the cached copy is still served
        store.inner.soft_delete(&Conditions::id(1)).await.unwrap();
        let stale = biz.get_restaurant(&cache, "restaurant:1", 1).await.unwrap();
        assert!(!stale.is_deleted());
        assert_eq!(store.finds(), 1);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cached_entry() {
        let store = CountingStore::with(vec![restaurant(1, STATUS_ACTIVE)]).await;
        let cache = MemoryCache::new();
        let get = GetRestaurantBiz::new(&store, TTL);
        get.get_restaurant(&cache, "restaurant:1", 1).await.unwrap();

        DeleteRestaurantBiz::new(&store)
            .delete_restaurant(&cache, "restaurant:1", 1)
            .await
            .unwrap();

        assert!(cache.keys("restaurant:1").await.unwrap().is_empty());
        let result = get.get_restaurant(&cache, "restaurant:1", 1).await;
        assert!(matches!(result, Err(AppError::EntityDeleted { .. })));
    }

    #[tokio::test]
    async fn test_delete_twice_is_rejected() {
        let store = CountingStore::with(vec![restaurant(1, STATUS_ACTIVE)]).await;
        let biz = DeleteRestaurantBiz::new(&store);

        biz.delete_restaurant(&DownCache, "restaurant:1", 1).await.unwrap();
        let result = biz.delete_restaurant(&DownCache, "restaurant:1", 1).await;

        assert!(matches!(result, Err(AppError::EntityDeleted { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = CountingStore::with(vec![]).await;

        let result = DeleteRestaurantBiz::new(&store)
            .delete_restaurant(&MemoryCache::new(), "restaurant:5", 5)
            .await;

        assert!(matches!(result, Err(AppError::EntityNotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_validates_and_does_not_cache() {
        let store = MemoryRestaurantStore::new();
        let biz = CreateRestaurantBiz::new(&store);

        let blank = RestaurantCreate {
            name: " ".to_string(),
            addr: String::new(),
        };
        assert!(matches!(
            biz.create_restaurant(&blank).await,
            Err(AppError::InvalidRequest(_))
        ));

        let data = RestaurantCreate {
            name: "Pho".to_string(),
            addr: String::new(),
        };
        let id = biz.create_restaurant(&data).await.unwrap();
        assert_eq!(id, 1);
    }
}
