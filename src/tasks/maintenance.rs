//! Cache Maintenance Task
//!
//! Background task that periodically sweeps expired entries and idle access
//! patterns out of the resource cache.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::cache::SharedCache;

// == Maintenance Task ==
/// Handle to a running maintenance task.
///
/// Dropping the handle without calling [`MaintenanceTask::stop`] also ends
/// the task at its next wake-up.
#[derive(Debug)]
pub struct MaintenanceTask {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl MaintenanceTask {
    /// Signals the task to stop and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Err(err) = (&mut self.handle).await {
            if !err.is_cancelled() {
                error!("Maintenance task ended abnormally: {}", err);
            }
        }
    }

    /// Cancels the task without waiting for it.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a background task that runs a maintenance sweep every `period`.
///
/// Each sweep takes the cache's write lock, drops expired entries that fail
/// revalidation, prunes idle access patterns and logs the cache statistics.
/// A sweep that panics is logged and the schedule carries on.
///
/// # Example
/// ```ignore
/// let cache: SharedCache = Arc::new(RwLock::new(ResourceCache::new(CacheConfig::default())));
/// let maintenance = spawn_maintenance_task(cache.clone(), Duration::from_secs(120));
/// // Later, during shutdown:
/// maintenance.stop().await;
/// ```
pub fn spawn_maintenance_task(cache: SharedCache, period: Duration) -> MaintenanceTask {
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        info!("Starting cache maintenance task with interval of {:?}", period);

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    info!("Cache maintenance task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = tokio::spawn(run_sweep(cache.clone())).await {
                        error!("Cache maintenance sweep failed: {}", err);
                    }
                }
            }
        }
    });

    MaintenanceTask {
        stop_tx: Some(stop_tx),
        handle,
    }
}

async fn run_sweep(cache: SharedCache) {
    let (report, stats) = {
        let mut cache_guard = cache.write().await;
        let report = cache_guard.run_maintenance();
        (report, cache_guard.stats())
    };

    if report.expired_removed > 0 || report.patterns_pruned > 0 {
        info!(
            expired_removed = report.expired_removed,
            revalidated = report.revalidated,
            patterns_pruned = report.patterns_pruned,
            "Cache maintenance removed stale data"
        );
    } else {
        debug!(revalidated = report.revalidated, "Cache maintenance: nothing to remove");
    }

    info!(
        entries = stats.size,
        memory_usage = stats.memory_usage,
        hit_rate = stats.hit_rate,
        average_access_count = stats.average_access_count,
        "Cache statistics"
    );
}
