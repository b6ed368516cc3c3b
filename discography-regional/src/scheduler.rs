//! Periodic regional synchronization
//!
//! Runs `sync()` on a fixed interval until cancelled. Failures are logged and
//! the loop keeps going; the next tick is the retry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::sync::{RegionalSyncService, SyncError};

/// Spawn the scheduled sync loop
///
/// Returns `None` when `interval` is zero (scheduling disabled). The first run
/// happens one full interval after spawning.
pub fn spawn_scheduler(
    service: Arc<RegionalSyncService>,
    interval: Duration,
    shutdown: CancellationToken,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        info!("Scheduled regional sync disabled");
        return None;
    }

    info!("Scheduled regional sync every {:?}", interval);

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scheduled regional sync stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match service.sync().await {
                        Ok(_) => {}
                        Err(SyncError::AlreadyRunning) => {
                            warn!("Skipping scheduled regional sync: a run is already in progress");
                        }
                        // Already logged by the service
                        Err(_) => {}
                    }
                }
            }
        }
    }))
}
