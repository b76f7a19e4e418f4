//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

// == Cache Entry ==
/// A stored value plus its expiration deadline.
///
/// Entries are owned by the store that created them and never handed out;
/// readers receive clones of `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry written at `now_ms` with optional TTL.
    pub fn new(value: V, ttl: Option<Duration>, now_ms: u64) -> Self {
        let expires_at = ttl.map(|ttl| {
            let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            now_ms.saturating_add(ttl_ms)
        });

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is still live at exactly `expires_at`; it is stale only once the
    /// current time has moved past the deadline.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at.map(|expires| expires.saturating_sub(now_ms))
    }
}
