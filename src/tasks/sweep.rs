//! Expired-Entry Sweep
//!
//! Lazy expiration only drops an entry when it is read. Entries that are never
//! read again stay in memory; this task reclaims them on a fixed period. It is
//! off unless `CACHE_SWEEP_INTERVAL` is set.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that periodically purges expired cache entries.
///
/// # Arguments
/// * `cache` - Shared cache manager
/// * `interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task(cache: Arc<CacheManager>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(interval_secs, "Starting expired-entry sweep task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!("Sweep: removed {} expired entries", removed);
            } else {
                debug!("Sweep: no expired entries found");
            }
        }
    })
}
