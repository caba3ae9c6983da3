//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_keys_handler, cache_remove_pattern_handler, create_restaurant_handler,
    delete_restaurant_handler, get_restaurant_handler, health_handler, ping_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /ping` - Liveness
/// - `GET /health` - Cache connectivity
/// - `POST /v1/restaurants` - Create a restaurant
/// - `GET /v1/restaurants/:id` - Cache-first lookup
/// - `DELETE /v1/restaurants/:id` - Soft delete and invalidate
/// - `GET /v1/cache/keys?pattern=` - List cache keys
/// - `DELETE /v1/cache?pattern=` - Bulk invalidation
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        .route("/restaurants", post(create_restaurant_handler))
        .route(
            "/restaurants/:id",
            get(get_restaurant_handler).delete(delete_restaurant_handler),
        )
        .route("/cache/keys", get(cache_keys_handler))
        .route("/cache", delete(cache_remove_pattern_handler));

    Router::new()
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .nest("/v1", v1)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
