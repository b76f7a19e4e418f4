//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror. None of these errors ever
//! cross the `CacheManager` boundary; they surface only through the error
//! tracker and, for the HTTP surface, as JSON error bodies.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be encoded to or decoded from its stored form
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store failed to read or write an entry
    #[error("Storage failure: {0}")]
    Storage(String),

    /// A response header could not be captured for replay
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A no-cache key pattern failed to compile
    #[error("Invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Nothing cached under the key (HTTP surface only)
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
