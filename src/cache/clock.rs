//! Clock Module
//!
//! Wall-clock source used for entry expiration. Production code uses the
//! system clock; tests freeze it and advance it by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// == Clock ==
/// Source of Unix-millisecond timestamps.
///
/// Cloning a frozen clock shares its time, so advancing one clone advances all.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    frozen: Option<Arc<AtomicU64>>,
}

impl Clock {
    /// Returns a clock backed by `SystemTime::now()`.
    pub fn system() -> Self {
        Self { frozen: None }
    }

    /// Returns a clock stopped at `millis` that only moves via [`Clock::advance_millis`].
    pub fn frozen_at(millis: u64) -> Self {
        Self {
            frozen: Some(Arc::new(AtomicU64::new(millis))),
        }
    }

    /// Current Unix timestamp in milliseconds.
    pub fn now_ms(&self) -> u64 {
        match &self.frozen {
            Some(millis) => millis.load(Ordering::SeqCst),
            None => current_timestamp_ms(),
        }
    }

    /// Moves a frozen clock forward. No-op on the system clock.
    pub fn advance_millis(&self, millis: u64) {
        if let Some(frozen) = &self.frozen {
            frozen.fetch_add(millis, Ordering::SeqCst);
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A system clock set before the epoch reads as 0 rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
