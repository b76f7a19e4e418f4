//! Request DTOs for the cache HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheOptions;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for PUT /cache
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl_ms`: Optional TTL in milliseconds (no expiration if omitted)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        if self.ttl_ms == Some(0) {
            return Some("ttl_ms must be greater than zero".to_string());
        }
        None
    }

    /// Cache options carried by this request.
    pub fn options(&self) -> CacheOptions {
        CacheOptions {
            ttl: self.ttl_ms.map(Duration::from_millis),
            size: None,
        }
    }
}
