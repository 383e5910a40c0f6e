//! Resource Cache - An adaptive in-memory cache for build and scan resources
//!
//! Provides key/value caching with usage-derived TTLs, LRU and value-scored
//! eviction, file revalidation and pattern or tag based invalidation.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_maintenance_task;
