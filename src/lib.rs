//! Cache-aside entity retrieval
//!
//! A storage-agnostic cache abstraction (Redis or in-memory) and a cache-first
//! lookup protocol in front of an authoritative entity store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod restaurant;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
