//! API Handlers
//!
//! HTTP request handlers for each service endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::Uri,
    Json,
};
use tracing::info;

use crate::cache::{Cache, KeyScheme};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{HealthResponse, PatternQuery, PingResponse, SuccessResponse};
use crate::restaurant::{
    CreateRestaurantBiz, DeleteRestaurantBiz, GetRestaurantBiz, Restaurant, RestaurantCreate,
    RestaurantStore, ENTITY_NAME,
};

/// Application state shared across all handlers.
///
/// Holds the cache and the persistent store as capabilities; handlers never
/// see the concrete backends.
#[derive(Clone)]
pub struct AppState {
    /// Cache in front of the store
    pub cache: Arc<dyn Cache>,
    /// Authoritative restaurant store
    pub store: Arc<dyn RestaurantStore>,
    /// How lookup keys are derived
    pub key_scheme: KeyScheme,
    /// TTL of entries populated by lookups
    pub cache_ttl: Duration,
}

impl AppState {
    /// Creates a new AppState with default key scheme and TTL.
    pub fn new(cache: Arc<dyn Cache>, store: Arc<dyn RestaurantStore>) -> Self {
        Self::from_config(cache, store, &Config::default())
    }

    /// Creates a new AppState taking key scheme and TTL from the Config.
    pub fn from_config(
        cache: Arc<dyn Cache>,
        store: Arc<dyn RestaurantStore>,
        config: &Config,
    ) -> Self {
        Self {
            cache,
            store,
            key_scheme: config.key_scheme,
            cache_ttl: config.cache_ttl(),
        }
    }

    /// Cache key of restaurant `id` for a request to `uri`. Takes the
    /// un-nested URI so route keys carry the full request path.
    fn restaurant_key(&self, id: i64, uri: &Uri) -> String {
        self.key_scheme.key_for(ENTITY_NAME, id, uri.path())
    }
}

/// Handler for GET /ping
pub async fn ping_handler() -> Json<PingResponse> {
    Json(PingResponse::pong())
}

/// Handler for GET /health
///
/// Reports whether the cache backend answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_cache_status(
        state.cache.is_connected().await,
    ))
}

/// Handler for POST /v1/restaurants
pub async fn create_restaurant_handler(
    State(state): State<AppState>,
    Json(req): Json<RestaurantCreate>,
) -> Result<Json<SuccessResponse<i64>>> {
    let id = CreateRestaurantBiz::new(state.store.as_ref())
        .create_restaurant(&req)
        .await?;

    Ok(Json(SuccessResponse::simple(id)))
}

/// Handler for GET /v1/restaurants/:id
///
/// Serves the restaurant cache-first.
pub async fn get_restaurant_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<SuccessResponse<Restaurant>>> {
    let key = state.restaurant_key(id, &uri);
    let restaurant = GetRestaurantBiz::new(state.store.as_ref(), state.cache_ttl)
        .get_restaurant(state.cache.as_ref(), &key, id)
        .await?;

    Ok(Json(SuccessResponse::simple(restaurant)))
}

/// Handler for DELETE /v1/restaurants/:id
///
/// Soft deletes the restaurant and drops its cache entry.
pub async fn delete_restaurant_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<SuccessResponse<bool>>> {
    let key = state.restaurant_key(id, &uri);
    DeleteRestaurantBiz::new(state.store.as_ref())
        .delete_restaurant(state.cache.as_ref(), &key, id)
        .await?;

    Ok(Json(SuccessResponse::simple(true)))
}

/// Handler for GET /v1/cache/keys
///
/// Lists cache keys matching `pattern` (all keys when omitted).
pub async fn cache_keys_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<SuccessResponse<Vec<String>>>> {
    let mut keys = state
        .cache
        .keys(query.pattern_or_all())
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;
    keys.sort();

    Ok(Json(SuccessResponse::simple(keys)))
}

/// Handler for DELETE /v1/cache
///
/// Removes every cache key matching `pattern`. Keys written while the removal
/// runs may survive it.
pub async fn cache_remove_pattern_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<SuccessResponse<bool>>> {
    if let Some(error_msg) = query.validate_for_removal() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let pattern = query.pattern_or_all();
    state
        .cache
        .remove_pattern(pattern)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?;
    info!(pattern, "cache entries invalidated");

    Ok(Json(SuccessResponse::simple(true)))
}
