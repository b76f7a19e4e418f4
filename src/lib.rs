//! Cache Layer - a best-effort request cache
//!
//! TTL-based in-process caching for generic values and HTTP responses, gated
//! by an admission policy. Cache failures degrade to misses and never reach
//! the request path.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheManager;
pub use config::Config;
pub use tasks::spawn_sweep_task;
