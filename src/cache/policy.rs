//! Cache Policy Module
//!
//! Admission rules deciding whether a key, value or HTTP request may use the
//! cache at all. Every predicate is pure: no I/O, no mutation, no store access.

use axum::http::{header::CACHE_CONTROL, HeaderMap, Method};
use regex::Regex;

use crate::cache::{CacheOptions, CacheRequest};
use crate::error::Result;

// == Public Constants ==
/// Keys matching any of these patterns are never cached.
pub const DEFAULT_NO_CACHE_PATTERNS: &[&str] = &["^temp:", "^session:"];

/// Largest value, in bytes, admitted to the cache by default (1 MiB).
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1024 * 1024;

// == Cache Policy ==
#[derive(Debug, Clone)]
pub struct CachePolicy {
    no_cache_patterns: Vec<Regex>,
    max_value_size: usize,
}

impl CachePolicy {
    // == Constructor ==
    /// Builds a policy from deny-list patterns and a value size ceiling.
    pub fn new<I, S>(no_cache_patterns: I, max_value_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let no_cache_patterns = no_cache_patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            no_cache_patterns,
            max_value_size,
        })
    }

    /// Adds one more deny-list pattern.
    pub fn deny(mut self, pattern: &str) -> Result<Self> {
        self.no_cache_patterns.push(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn max_value_size(&self) -> usize {
        self.max_value_size
    }

    // == Should Cache ==
    /// Whether `key` may be read from or written to the data cache.
    ///
    /// Denied when the key matches a no-cache pattern or the declared
    /// `options.size` exceeds the ceiling.
    pub fn should_cache(&self, key: &str, options: &CacheOptions) -> bool {
        if self.no_cache_patterns.iter().any(|re| re.is_match(key)) {
            return false;
        }

        !matches!(options.size, Some(size) if size > self.max_value_size)
    }

    // == Should Cache Response ==
    /// Whether the response to `request` may be stored.
    ///
    /// Only anonymous GET requests without `Cache-Control: no-cache` qualify.
    /// Authenticated responses may be per-principal and are never shared.
    pub fn should_cache_response(&self, request: &CacheRequest) -> bool {
        request.method == Method::GET
            && request.user.is_none()
            && !requests_no_cache(&request.headers)
    }

    // == Should Serve From Cache ==
    /// Whether a stored response may answer `request`.
    pub fn should_serve_from_cache(&self, request: &CacheRequest) -> bool {
        !requests_no_cache(&request.headers)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_NO_CACHE_PATTERNS, DEFAULT_MAX_VALUE_SIZE)
            .expect("default no-cache patterns are valid")
    }
}

/// True when any `Cache-Control` header carries the `no-cache` directive.
fn requests_no_cache(headers: &HeaderMap) -> bool {
    headers
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|directive| directive.trim().eq_ignore_ascii_case("no-cache"))
}
