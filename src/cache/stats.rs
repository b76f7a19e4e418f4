//! Cache Statistics Module
//!
//! Per-operation metrics records and the aggregate counters derived from them.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Operation ==
/// Every operation the manager reports metrics or errors for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Get,
    Set,
    Delete,
    Response,
    ResponseGet,
    Purge,
    Clear,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Delete => "delete",
            Operation::Response => "response",
            Operation::ResponseGet => "response_get",
            Operation::Purge => "purge",
            Operation::Clear => "clear",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Metrics Record ==
/// One executed cache operation. Built per call and dropped after reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    pub operation: Operation,
    pub key: String,
    pub hit: bool,
    pub duration_ms: f64,
    pub cache_id: String,
    pub timestamp: DateTime<Utc>,
}

// == Stats Snapshot ==
/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub errors: u64,
    /// `hits / (hits + misses)`; `None` before the first read
    pub hit_rate: Option<f64>,
}

// == Cache Stats ==
/// Lifetime counters, safe to update from any task.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    errors: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record ==
    /// Folds one operation into the counters.
    ///
    /// Reads count as a hit or a miss; writes count as a set. Maintenance
    /// operations leave the counters untouched.
    pub fn record(&self, metrics: &MetricsRecord) {
        match metrics.operation {
            Operation::Get | Operation::ResponseGet => {
                if metrics.hit {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                }
            }
            Operation::Set | Operation::Response => {
                self.sets.fetch_add(1, Ordering::Relaxed);
            }
            Operation::Delete | Operation::Purge | Operation::Clear => {}
        }
    }

    // == Record Error ==
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    pub fn snapshot(&self) -> StatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        StatsSnapshot {
            hits,
            misses,
            sets: self.sets.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            hit_rate: hit_rate(hits, misses),
        }
    }
}

// == Hit Rate ==
/// Returns `hits / (hits + misses)`, or `None` if no reads have been made.
pub fn hit_rate(hits: u64, misses: u64) -> Option<f64> {
    let total = hits + misses;
    if total == 0 {
        None
    } else {
        Some(hits as f64 / total as f64)
    }
}
