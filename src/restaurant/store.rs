//! Persistent store collaborator
//!
//! The store is authoritative for restaurants. Business logic only sees the
//! capability traits below; `MemoryRestaurantStore` is an in-process
//! implementation used by the binary and by tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use super::model::{Restaurant, RestaurantCreate, STATUS_ACTIVE, STATUS_DELETED};

/// Failures reported by the persistent store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record matches the conditions
    #[error("record not found")]
    RecordNotFound,

    /// Any other store failure
    #[error("store error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Column/value equality conditions for a lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions(HashMap<String, Value>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conditions selecting a single record by id.
    pub fn id(id: i64) -> Self {
        Self::new().with("id", id)
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.0.iter()
    }
}

#[async_trait]
pub trait FindRestaurantStore: Send + Sync {
    /// Finds one restaurant matching every condition. `more_keys` names
    /// related data to load alongside the record.
    async fn find_restaurant_by_id(
        &self,
        conditions: &Conditions,
        more_keys: &[&str],
    ) -> StoreResult<Restaurant>;
}

#[async_trait]
pub trait CreateRestaurantStore: Send + Sync {
    /// Inserts a new live restaurant and returns its id.
    async fn create(&self, data: &RestaurantCreate) -> StoreResult<i64>;
}

#[async_trait]
pub trait SoftDeleteRestaurantStore: Send + Sync {
    /// Marks the restaurant matching `conditions` as deleted.
    async fn soft_delete(&self, conditions: &Conditions) -> StoreResult<()>;
}

/// Every restaurant capability, for callers holding one store handle.
pub trait RestaurantStore:
    FindRestaurantStore + CreateRestaurantStore + SoftDeleteRestaurantStore
{
}

impl<T> RestaurantStore for T where
    T: FindRestaurantStore + CreateRestaurantStore + SoftDeleteRestaurantStore
{
}

// == Memory Store ==
#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Restaurant>,
    last_id: i64,
}

impl Table {
    fn find(&self, conditions: &Conditions) -> StoreResult<Option<i64>> {
        for (id, row) in &self.rows {
            let row_value = serde_json::to_value(row)
                .map_err(|err| StoreError::Backend(err.to_string()))?;

            let mut matched = true;
            for (column, expected) in conditions.iter() {
                match row_value.get(column) {
                    Some(actual) => matched &= actual == expected,
                    None => return Err(StoreError::Backend(format!("unknown column '{column}'"))),
                }
            }
            if matched {
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }
}

/// In-process restaurant table.
#[derive(Debug, Clone, Default)]
pub struct MemoryRestaurantStore {
    table: Arc<RwLock<Table>>,
}

impl MemoryRestaurantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a row as-is, keeping the id sequence ahead of it.
    pub async fn insert(&self, restaurant: Restaurant) {
        let mut table = self.table.write().await;
        table.last_id = table.last_id.max(restaurant.id);
        table.rows.insert(restaurant.id, restaurant);
    }
}

#[async_trait]
impl FindRestaurantStore for MemoryRestaurantStore {
    async fn find_restaurant_by_id(
        &self,
        conditions: &Conditions,
        more_keys: &[&str],
    ) -> StoreResult<Restaurant> {
        if !more_keys.is_empty() {
            debug!(?more_keys, "memory store has no relations to load");
        }

        let table = self.table.read().await;
        match table.find(conditions)? {
            Some(id) => table.rows.get(&id).cloned().ok_or(StoreError::RecordNotFound),
            None => Err(StoreError::RecordNotFound),
        }
    }
}

#[async_trait]
impl CreateRestaurantStore for MemoryRestaurantStore {
    async fn create(&self, data: &RestaurantCreate) -> StoreResult<i64> {
        let mut table = self.table.write().await;
        let id = table.last_id + 1;
        let now = Utc::now();

        table.rows.insert(
            id,
            Restaurant {
                id,
                name: data.name.trim().to_string(),
                addr: data.addr.clone(),
                status: STATUS_ACTIVE,
                created_at: Some(now),
                updated_at: Some(now),
            },
        );
        table.last_id = id;
        Ok(id)
    }
}

#[async_trait]
impl SoftDeleteRestaurantStore for MemoryRestaurantStore {
    async fn soft_delete(&self, conditions: &Conditions) -> StoreResult<()> {
        let mut table = self.table.write().await;
        let id = table.find(conditions)?.ok_or(StoreError::RecordNotFound)?;

        if let Some(row) = table.rows.get_mut(&id) {
            row.status = STATUS_DELETED;
            row.updated_at = Some(Utc::now());
        }
        Ok(())
    }
}
