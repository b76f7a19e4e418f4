//! Cache Module
//!
//! TTL-based in-process caching with an admission policy, separate stores for
//! generic values and HTTP responses, and a manager that keeps every failure
//! away from the caller.

mod clock;
mod entry;
mod eviction;
mod key;
mod manager;
mod options;
mod policy;
mod request;
mod stats;
mod store;


// Re-export public types
pub use clock::Clock;
pub use entry::CacheEntry;
pub use eviction::{EvictionPolicy, LruEviction, Unbounded};
pub use key::{canonical_json, generate_cache_id, generate_response_cache_key};
pub use manager::CacheManager;
pub use options::CacheOptions;
pub use policy::{CachePolicy, DEFAULT_MAX_VALUE_SIZE, DEFAULT_NO_CACHE_PATTERNS};
pub use request::{CacheRequest, CachedResponse, Principal};
pub use stats::{hit_rate, CacheStats, MetricsRecord, Operation, StatsSnapshot};
pub use store::{CacheBackend, MemoryStore};

/// Store for generic values, kept as JSON.
pub type DataCache = MemoryStore<serde_json::Value>;

/// Store for replayable HTTP responses.
pub type ResponseCache = MemoryStore<CachedResponse>;
