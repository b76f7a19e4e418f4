//! Request and response shapes seen by the response cache.

use std::collections::BTreeMap;

use axum::{
    body::{Body, Bytes},
    http::{request, response, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Principal ==
/// Marks a request as authenticated. Inserted as a request extension by
/// whatever auth layer runs in front of the cache middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

// == Cache Request ==
/// The parts of an incoming HTTP request the cache policy and key derivation
/// look at.
#[derive(Debug, Clone)]
pub struct CacheRequest {
    pub method: Method,
    /// Path and query, as received
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Authenticated principal, if any
    pub user: Option<String>,
}

impl CacheRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            user: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Builds a cache request from buffered HTTP request parts.
    ///
    /// JSON bodies are kept as JSON so key derivation can canonicalize them;
    /// anything else is keyed by its (lossy) text.
    pub fn from_parts(parts: &request::Parts, body: &[u8]) -> Self {
        let body = if body.is_empty() {
            None
        } else {
            Some(
                serde_json::from_slice(body)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
            )
        };

        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.to_string());

        Self {
            method: parts.method.clone(),
            url,
            headers: parts.headers.clone(),
            body,
            user: parts
                .extensions
                .get::<Principal>()
                .map(|principal| principal.0.clone()),
        }
    }
}

// == Cached Response ==
/// Everything needed to replay a handler's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub data: Bytes,
    pub headers: BTreeMap<String, String>,
    pub status: u16,
}

impl CachedResponse {
    /// Captures status and headers from response parts alongside the body.
    ///
    /// Repeated headers are joined with `", "`. A header value that is not
    /// visible ASCII cannot be replayed faithfully and is rejected.
    pub fn capture(parts: &response::Parts, data: Bytes) -> Result<Self> {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();

        for (name, value) in &parts.headers {
            let value = value.to_str().map_err(|err| CacheError::InvalidHeader {
                name: name.to_string(),
                reason: err.to_string(),
            })?;

            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        Ok(Self {
            data,
            headers,
            status: parts.status.as_u16(),
        })
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.data));
        *response.status_mut() =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        response
    }
}
