//! API Module
//!
//! HTTP handlers, routing and the response cache middleware.
//!
//! # Endpoints
//! - `PUT /cache` - Offer a value to the cache
//! - `GET /cache/:key` - Read a cached value
//! - `DELETE /cache/:key` - Drop a cached value
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::response_cache;
pub use routes::create_router;
