//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::cache::{CacheManager, CacheOptions, CachePolicy, DataCache, LruEviction, ResponseCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the single cache manager for the process; it is built once at
/// startup and injected here rather than living in a global.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager>,
    /// TTL the response middleware applies
    pub response_ttl: Duration,
}

impl AppState {
    /// Creates a new AppState around an existing manager.
    pub fn new(cache: CacheManager, response_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(cache),
            response_ttl,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Fails only if a configured no-cache pattern is not a valid regex.
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = CachePolicy::new(&config.no_cache_patterns, config.max_value_size)?;

        let cache = match config.max_entries {
            Some(max_entries) => CacheManager::new(
                policy,
                Arc::new(DataCache::new().with_eviction(LruEviction::new(max_entries))),
                Arc::new(ResponseCache::new().with_eviction(LruEviction::new(max_entries))),
            ),
            None => CacheManager::in_memory(policy),
        };

        Ok(Self::new(cache, config.response_ttl()))
    }
}

/// Handler for PUT /cache
///
/// Offers a value to the cache. A declined or failed write is reported in
/// the body, not as an HTTP error.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cached = state.cache.set(&req.key, &req.value, &req.options()).await;

    Ok(Json(SetResponse::new(req.key, cached)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value: Option<Value> = state.cache.get(&key, &CacheOptions::default()).await;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.delete(&key).await;
    Json(DeleteResponse::new(key, deleted))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/greeting/:name
///
/// Stand-in for an expensive downstream handler; mounted behind the response
/// cache so repeated calls are answered from the cache.
pub async fn greeting_handler(Path(name): Path<String>) -> Json<Value> {
    Json(json!({
        "message": format!("Hello, {}!", name),
        "generated_at": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
    }))
}
