//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_VALUE_SIZE, DEFAULT_NO_CACHE_PATTERNS};

/// Cache layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Largest value, in bytes, the policy admits
    pub max_value_size: usize,
    /// TTL the response middleware applies to cached responses
    pub response_ttl_ms: u64,
    /// Keys matching any of these patterns are never cached
    pub no_cache_patterns: Vec<String>,
    /// LRU bound per store; None keeps stores unbounded
    pub max_entries: Option<usize>,
    /// Expired-entry sweep period in seconds; None disables the sweep
    pub sweep_interval: Option<u64>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_MAX_VALUE_SIZE` - Value size ceiling in bytes (default: 1048576)
    /// - `CACHE_RESPONSE_TTL_MS` - Response TTL in milliseconds (default: 60000)
    /// - `CACHE_NO_CACHE_PATTERNS` - Comma-separated regexes (default: `^temp:,^session:`)
    /// - `CACHE_MAX_ENTRIES` - LRU bound per store (default: unbounded)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep period in seconds (default: no sweep)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            max_value_size: parse_var("CACHE_MAX_VALUE_SIZE").unwrap_or(defaults.max_value_size),
            response_ttl_ms: parse_var("CACHE_RESPONSE_TTL_MS").unwrap_or(defaults.response_ttl_ms),
            no_cache_patterns: env::var("CACHE_NO_CACHE_PATTERNS")
                .ok()
                .map(|v| split_patterns(&v))
                .unwrap_or(defaults.no_cache_patterns),
            max_entries: parse_var::<usize>("CACHE_MAX_ENTRIES").filter(|n| *n > 0),
            sweep_interval: parse_var::<u64>("CACHE_SWEEP_INTERVAL").filter(|n| *n > 0),
        }
    }

    pub fn response_ttl(&self) -> Duration {
        Duration::from_millis(self.response_ttl_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            response_ttl_ms: 60_000,
            no_cache_patterns: DEFAULT_NO_CACHE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_entries: None,
            sweep_interval: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn split_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
