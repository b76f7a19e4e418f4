//! Cache Store Module
//!
//! The storage seam of the cache layer. [`CacheBackend`] is the contract every
//! store honours; [`MemoryStore`] is the in-process implementation backing
//! both the data cache and the response cache. A shared remote store plugs in
//! by implementing the same trait.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, Clock, EvictionPolicy, Unbounded};
use crate::error::Result;

// == Cache Backend ==
/// Key-value storage with optional per-entry TTL.
///
/// `get` never returns an entry past its deadline. Writes are last-write-wins.
#[async_trait]
pub trait CacheBackend<V>: Send + Sync
where
    V: Send + 'static,
{
    /// Returns the live value stored under `key`, dropping it if it has expired.
    async fn get(&self, key: &str) -> Result<Option<V>>;

    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<()>;

    /// Removes `key`. Returns whether an entry was present.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Removes every expired entry and returns how many were dropped.
    async fn purge_expired(&self) -> Result<usize>;

    /// Removes every entry.
    async fn clear(&self) -> Result<()>;

    /// Number of stored entries, expired-but-unread ones included.
    async fn len(&self) -> Result<usize>;
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    eviction: Box<dyn EvictionPolicy>,
}

// == Memory Store ==
/// In-process store with lazy expiration.
///
/// The map sits behind a single write lock for reads as well, so the
/// read-check-expire-delete sequence in `get` is atomic.
#[derive(Debug)]
pub struct MemoryStore<V> {
    inner: RwLock<Inner<V>>,
    clock: Clock,
}

impl<V> MemoryStore<V> {
    // == Constructor ==
    /// Creates an unbounded store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Clock::system())
    }

    /// Creates an unbounded store reading time from `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                eviction: Box::new(Unbounded),
            }),
            clock,
        }
    }

    /// Replaces the eviction policy. Only meaningful before the store is shared.
    pub fn with_eviction(self, eviction: impl EvictionPolicy + 'static) -> Self {
        let mut inner = self.inner.into_inner();
        inner.eviction = Box::new(eviction);
        Self {
            inner: RwLock::new(inner),
            clock: self.clock,
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> CacheBackend<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>> {
        let now = self.clock.now_ms();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return Ok(None),
        };

        if expired {
            inner.entries.remove(key);
            inner.eviction.on_remove(key);
            debug!(key, "dropped expired entry on read");
            return Ok(None);
        }

        inner.eviction.on_access(key);
        Ok(inner.entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry::new(value, ttl, self.clock.now_ms());
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if !inner.entries.contains_key(key) {
            if let Some(victim) = inner.eviction.victim(inner.entries.len()) {
                inner.entries.remove(&victim);
                debug!(key = %victim, "evicted entry to make room");
            }
        }

        inner.entries.insert(key.to_string(), entry);
        inner.eviction.on_insert(key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let removed = inner.entries.remove(key).is_some();
        inner.eviction.on_remove(key);
        Ok(removed)
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now_ms();
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let expired_keys: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            inner.entries.remove(key);
            inner.eviction.on_remove(key);
        }

        Ok(expired_keys.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.entries.clear();
        guard.eviction.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.inner.read().await.entries.len())
    }
}
