//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, greeting_handler, health_handler, set_handler, stats_handler,
    AppState,
};
use super::middleware::response_cache;

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /cache` - Offer a value to the cache
/// - `GET /cache/:key` - Read a cached value
/// - `DELETE /cache/:key` - Drop a cached value
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
/// - `GET /api/greeting/:name` - Sample handler behind the response cache
///
/// # Middleware
/// - Response cache: only on `/api` routes
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cached_api = Router::new()
        .route("/api/greeting/:name", get(greeting_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), response_cache));

    Router::new()
        .route("/cache", put(set_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .merge(cached_api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheManager, CachePolicy};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let cache = CacheManager::in_memory(CachePolicy::default());
        create_router(AppState::new(cache, Duration::from_secs(60)))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/cache")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"test","value":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_greeting_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/greeting/ann")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
