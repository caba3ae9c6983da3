//! Restaurant Module
//!
//! The restaurant entity, its persistent store collaborator, and the business
//! logic serving it through the cache.

pub mod biz;
pub mod model;
pub mod store;

pub use biz::{CreateRestaurantBiz, DeleteRestaurantBiz, GetRestaurantBiz};
pub use model::{Restaurant, RestaurantCreate, ENTITY_NAME};
pub use store::{
    Conditions, CreateRestaurantStore, FindRestaurantStore, MemoryRestaurantStore,
    RestaurantStore, SoftDeleteRestaurantStore, StoreError, StoreResult,
};
