//! Monitoring Interfaces
//!
//! The error tracker and metrics sink the cache reports to. Both are
//! fire-and-forget: implementations must not fail or block the caller.

use tracing::{debug, warn};

use crate::cache::{MetricsRecord, Operation, StatsSnapshot};
use crate::error::CacheError;

/// Component name attached to every error report.
pub const COMPONENT: &str = "cache-manager";

// == Error Context ==
/// Where an absorbed error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub component: &'static str,
    pub operation: Operation,
    pub key: String,
    pub cache_id: String,
}

// == Error Tracker ==
pub trait ErrorTracker: Send + Sync {
    fn track(&self, error: &CacheError, context: &ErrorContext);
}

// == Metrics Sink ==
pub trait MetricsSink: Send + Sync {
    /// Receives one record per executed operation.
    fn track_cache(&self, metrics: &MetricsRecord);

    /// Receives the aggregate after each record was folded in.
    fn track_stats(&self, _stats: &StatsSnapshot) {}
}

// == Tracing Monitor ==
/// Default monitor: errors become `warn` events, metrics `debug` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitor;

impl ErrorTracker for TracingMonitor {
    fn track(&self, error: &CacheError, context: &ErrorContext) {
        warn!(
            component = context.component,
            operation = %context.operation,
            key = %context.key,
            cache_id = %context.cache_id,
            error = %error,
            "cache operation failed; treating as miss"
        );
    }
}

impl MetricsSink for TracingMonitor {
    fn track_cache(&self, metrics: &MetricsRecord) {
        debug!(
            operation = %metrics.operation,
            key = %metrics.key,
            hit = metrics.hit,
            duration_ms = metrics.duration_ms,
            cache_id = %metrics.cache_id,
            "cache operation"
        );
    }
}
