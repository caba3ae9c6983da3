//! Response DTOs for the service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

/// Envelope of every successful response
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
}

impl<T> SuccessResponse<T> {
    /// Creates a response carrying only `data`
    pub fn simple(data: T) -> Self {
        Self {
            data,
            paging: None,
            filter: None,
        }
    }
}

/// Response body for GET /ping
#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub message: String,
}

impl PingResponse {
    pub fn pong() -> Self {
        Self {
            message: "pong".to_string(),
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `healthy` when the cache answers, `degraded` otherwise
    pub status: String,
    pub cache_connected: bool,
}

impl HealthResponse {
    /// Creates a health response from the cache liveness result.
    pub fn from_cache_status(cache_connected: bool) -> Self {
        let status = if cache_connected { "healthy" } else { "degraded" };
        Self {
            status: status.to_string(),
            cache_connected,
        }
    }
}
