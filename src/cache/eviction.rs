//! Eviction Module
//!
//! Size-bounded eviction as an opt-in extension to TTL expiration. The default
//! policy never evicts: entries live until they expire or are overwritten.

use std::collections::VecDeque;
use std::fmt::Debug;

// == Eviction Policy ==
/// Decides which key to drop when a store is about to grow.
///
/// The store calls these hooks while holding its write lock, so implementations
/// need no synchronization of their own.
pub trait EvictionPolicy: Debug + Send + Sync {
    /// A key was read successfully.
    fn on_access(&mut self, key: &str);

    /// A key was written (new or overwritten).
    fn on_insert(&mut self, key: &str);

    /// A key left the store (deleted, expired or evicted).
    fn on_remove(&mut self, key: &str);

    /// Called before inserting a new key into a store holding `len` entries.
    /// Returns the key to evict, if any.
    fn victim(&mut self, len: usize) -> Option<String>;

    /// Forgets all tracked keys.
    fn clear(&mut self);
}

// == Unbounded ==
/// Never evicts. Growth is bounded only by TTL and per-value size caps.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unbounded;

impl EvictionPolicy for Unbounded {
    fn on_access(&mut self, _key: &str) {}

    fn on_insert(&mut self, _key: &str) {}

    fn on_remove(&mut self, _key: &str) {}

    fn victim(&mut self, _len: usize) -> Option<String> {
        None
    }

    fn clear(&mut self) {}
}

// == LRU Eviction ==
/// Keeps at most `capacity` keys, evicting the least recently used one.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct LruEviction {
    capacity: usize,
    order: VecDeque<String>,
}

impl LruEviction {
    // == Constructor ==
    /// Creates an LRU policy holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front).
    fn touch(&mut self, key: &str) {
        self.on_remove(key);
        self.order.push_front(key.to_string());
    }

    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.back()
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl EvictionPolicy for LruEviction {
    fn on_access(&mut self, key: &str) {
        self.touch(key);
    }

    fn on_insert(&mut self, key: &str) {
        self.touch(key);
    }

    fn on_remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    fn victim(&mut self, len: usize) -> Option<String> {
        if len < self.capacity {
            return None;
        }
        self.order.pop_back()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}
