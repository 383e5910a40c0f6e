//! API Handlers
//!
//! HTTP request handlers for each resource cache endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{CacheStatsSnapshot, ResourceCache, SharedCache};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ClearResponse, DeleteResponse, GetResponse, HasResponse, HealthResponse,
    InvalidateRequest, InvalidateResponse, KeysQuery, KeysResponse, SetRequest, SetResponse,
};
use crate::tasks::{spawn_maintenance_task, MaintenanceTask};

/// Application state shared across all handlers.
///
/// Contains the resource cache wrapped in Arc<RwLock<>> for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe resource cache
    pub cache: SharedCache,
}

impl AppState {
    /// Creates a new AppState with the given cache.
    pub fn new(cache: ResourceCache) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(ResourceCache::new(config.cache_config()))
    }

    /// Starts the periodic maintenance sweep over this state's cache.
    pub fn start_maintenance(&self, period: Duration) -> MaintenanceTask {
        spawn_maintenance_task(self.cache.clone(), period)
    }

    /// Stops maintenance and drops all cached state.
    ///
    /// Meant to be called once, at shutdown.
    pub async fn destroy(&self, maintenance: MaintenanceTask) {
        maintenance.stop().await;
        self.cache.write().await.destroy();
        info!("Resource cache destroyed");
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(error_msg) => Err(CacheError::InvalidRequest(error_msg)),
        None => Ok(key),
    }
}

/// Handler for PUT /set
///
/// Stores a value in the cache with optional TTL and tags.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let value = req.resource_value();
    let mut cache = state.cache.write().await;
    cache.set_with_tags(req.key.clone(), value, req.ttl, req.tags)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/*key
///
/// Retrieves a value by key; misses are reported as 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let key = checked_key(key)?;

    // Write lock: reads update access statistics and may drop expired entries
    let mut cache = state.cache.write().await;
    match cache.get(&key)? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for GET /has/*key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<HasResponse>> {
    let key = checked_key(key)?;

    let mut cache = state.cache.write().await;
    let exists = cache.has(&key)?;

    Ok(Json(HasResponse { key, exists }))
}

/// Handler for DELETE /del/*key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let key = checked_key(key)?;

    let mut cache = state.cache.write().await;
    if cache.delete(&key)? {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for POST /invalidate
///
/// Removes entries by pattern, key pattern and/or tags.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let mut cache = state.cache.write().await;
    let removed = match (req.rule(), req.pattern.as_deref()) {
        (Some(rule), _) => cache.invalidate_rule(&rule)?,
        (None, Some(pattern)) => cache.invalidate(pattern)?,
        (None, None) => 0,
    };

    Ok(Json(InvalidateResponse { removed }))
}

/// Handler for GET /keys
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Json<KeysResponse> {
    let cache = state.cache.read().await;
    Json(KeysResponse {
        keys: cache.keys(query.pattern.as_deref()),
    })
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let mut cache = state.cache.write().await;
    cache.clear()?;

    Ok(Json(ClearResponse::cleared()))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStatsSnapshot> {
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
