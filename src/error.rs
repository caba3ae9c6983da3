//! Error types for the cache-aside service
//!
//! Two layers: `CacheError` is produced by cache backends and never leaves the
//! retrieval component, `AppError` is the domain taxonomy surfaced to callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Failures raised by a `Cache` backend.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is absent or its TTL has elapsed
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Stored payload could not be decoded into the requested shape
    /// (or a value could not be encoded on write)
    #[error("Corrupt value for key {key}: {source}")]
    ValueCorrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Backend unreachable, failed, or did not answer within its timeout
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Unavailable(err.to_string())
    }
}

/// Convenience Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == App Error Enum ==
/// Domain errors returned to the transport layer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Store has no record matching the lookup
    #[error("{entity} not found")]
    EntityNotFound { entity: String },

    /// Store failed for a reason other than "record not found"
    #[error("cannot get {entity}: {source}")]
    EntityUnavailable {
        entity: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Record exists but is soft deleted
    #[error("{entity} has been deleted")]
    EntityDeleted { entity: String },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code for this error kind.
    pub fn error_key(&self) -> String {
        match self {
            AppError::EntityNotFound { entity } => format!("Err{}NotFound", title(entity)),
            AppError::EntityUnavailable { entity, .. } => {
                format!("ErrCannotGet{}", title(entity))
            }
            AppError::EntityDeleted { entity } => format!("Err{}Deleted", title(entity)),
            AppError::InvalidRequest(_) => "ErrInvalidRequest".to_string(),
            AppError::Internal(_) => "ErrInternal".to_string(),
        }
    }

    /// HTTP status the transport layer maps this error to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::EntityUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EntityDeleted { .. } => StatusCode::GONE,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Root cause, used as the `log` field of the response body.
    fn root_cause(&self) -> String {
        let mut current: &dyn std::error::Error = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current.to_string()
    }
}

fn title(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "status_code": status.as_u16(),
            "message": self.to_string(),
            "log": self.root_cause(),
            "error_key": self.error_key(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for domain operations.
pub type Result<T> = std::result::Result<T, AppError>;
