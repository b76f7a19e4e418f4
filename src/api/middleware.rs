//! Response Cache Middleware
//!
//! Serves repeated requests from the response cache and stores fresh
//! successful responses on the way out.
//!
//! Only bodies with a known size within the policy ceiling are ever buffered.
//! Everything else (non-GET requests, streamed or oversized responses) passes
//! through untouched.

use axum::{
    body::{to_bytes, Body, HttpBody},
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::api::AppState;
use crate::cache::{CacheOptions, CacheRequest};

/// Axum middleware wrapping a handler with the response cache.
///
/// On a hit the stored status, headers and body are replayed and the handler
/// is skipped. On a miss the handler runs; 2xx responses whose body has a
/// known size within the policy's ceiling are offered to the cache before
/// being returned.
pub async fn response_cache(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let max_size = state.cache.policy().max_value_size();

    if request.method() != Method::GET || !fits(request.body(), max_size) {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, max_size).await {
        Ok(body) => body,
        Err(err) => {
            warn!(error = %err, "failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let cache_request = CacheRequest::from_parts(&parts, &body);
    if let Some(cached) = state.cache.get_response(&cache_request).await {
        debug!(url = %cache_request.url, "serving response from cache");
        return cached.into_response();
    }

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;
    if !response.status().is_success() || !fits(response.body(), max_size) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let data = match to_bytes(body, max_size).await {
        Ok(data) => data,
        Err(err) => {
            warn!(error = %err, "failed to read response body");
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    state
        .cache
        .cache_response(
            &cache_request,
            &parts,
            data.clone(),
            &CacheOptions::with_ttl(state.response_ttl),
        )
        .await;

    Response::from_parts(parts, Body::from(data))
}

/// True when the body's upper size bound is known and within `max_size`.
fn fits(body: &Body, max_size: usize) -> bool {
    body.size_hint()
        .upper()
        .is_some_and(|upper| upper <= max_size as u64)
}
