//! Restaurant entity and its create payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity name used in cache keys and error codes.
pub const ENTITY_NAME: &str = "restaurant";

/// Status value marking a soft-deleted record.
pub const STATUS_DELETED: i32 = 0;

/// Status value of a live record.
pub const STATUS_ACTIVE: i32 = 1;

/// A restaurant as stored in the persistent store and in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub addr: String,
    pub status: i32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Restaurant {
    /// True once the record has been soft deleted.
    pub fn is_deleted(&self) -> bool {
        self.status == STATUS_DELETED
    }
}

/// Request body for creating a restaurant.
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    #[serde(default)]
    pub addr: String,
}

impl RestaurantCreate {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Restaurant name cannot be empty".to_string());
        }
        None
    }
}
