//! Response DTOs for the cache HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::StatsSnapshot;

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /cache
///
/// `cached` is false when the policy declined the value or the store failed;
/// either way the request itself succeeded.
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub key: String,
    pub cached: bool,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, cached: bool) -> Self {
        Self {
            key: key.into(),
            cached,
        }
    }
}

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub key: String,
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, deleted: bool) -> Self {
        Self {
            key: key.into(),
            deleted,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub errors: u64,
    /// Null until the first read
    pub hit_rate: Option<f64>,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            errors: stats.errors,
            hit_rate: stats.hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("user:42", serde_json::json!({"name": "Ann"}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "user:42");
        assert_eq!(json["value"]["name"], "Ann");
    }

    #[test]
    fn test_set_response_serialize() {
        let json = serde_json::to_value(SetResponse::new("temp:x", false)).unwrap();
        assert_eq!(json["cached"], false);
    }

    #[test]
    fn test_stats_response_null_hit_rate() {
        let stats = StatsSnapshot {
            hits: 0,
            misses: 0,
            sets: 3,
            errors: 0,
            hit_rate: None,
        };
        let json = serde_json::to_value(StatsResponse::from(stats)).unwrap();
        assert!(json["hit_rate"].is_null());
        assert_eq!(json["sets"], 3);
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = StatsSnapshot {
            hits: 80,
            misses: 20,
            sets: 0,
            errors: 0,
            hit_rate: Some(0.8),
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate.unwrap() - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("Something went wrong")).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
