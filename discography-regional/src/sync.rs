//! Regional synchronization service
//!
//! One run: fetch → load active → reconcile → single batch write. Runs are
//! serialized; a trigger that arrives while another run is in progress is
//! rejected rather than queued. Nothing is retried here, retry policy
//! belongs to whoever triggers the run.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::reconcile::{reconcile, ReconcileError, ReconciliationResult};
use crate::source::{RegionalSource, SourceError};
use crate::store::{RegionalStore, StoreError};

/// Reasons a sync run did not complete
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("A regional synchronization is already running")]
    AlreadyRunning,

    #[error("Regional source unavailable: {0}")]
    SourceUnavailable(#[source] SourceError),

    #[error("Invalid regional data: {0}")]
    InvalidSourceData(#[from] ReconcileError),

    #[error("Failed to persist regionals: {0}")]
    PersistenceFailure(#[source] StoreError),
}

/// Runs reconciliations against injected collaborators
pub struct RegionalSyncService {
    source: Arc<dyn RegionalSource>,
    store: Arc<dyn RegionalStore>,
    run_guard: Mutex<()>,
}

impl RegionalSyncService {
    pub fn new(source: Arc<dyn RegionalSource>, store: Arc<dyn RegionalStore>) -> Self {
        Self {
            source,
            store,
            run_guard: Mutex::new(()),
        }
    }

    /// Synchronize stored regionals with the external source
    pub async fn sync(&self) -> Result<ReconciliationResult, SyncError> {
        let _guard = self.run_guard.try_lock().map_err(|_| SyncError::AlreadyRunning)?;

        let result = self.run().await;
        match &result {
            Ok(counts) => info!(
                new = counts.new,
                inactivated = counts.inactivated,
                changed = counts.changed,
                "Regional synchronization completed"
            ),
            Err(e) => error!("Regional synchronization failed: {}", e),
        }
        result
    }

    async fn run(&self) -> Result<ReconciliationResult, SyncError> {
        let external = self
            .source
            .fetch_all()
            .await
            .map_err(SyncError::SourceUnavailable)?;

        let active = self
            .store
            .load_active()
            .await
            .map_err(SyncError::PersistenceFailure)?;

        info!(
            external = external.len(),
            active = active.len(),
            "Reconciling regionals"
        );

        let plan = reconcile(&external, active)?;
        let result = plan.result();

        if plan.is_empty() {
            return Ok(result);
        }

        let batch = plan.into_batch();
        self.store
            .save_all(&batch)
            .await
            .map_err(SyncError::PersistenceFailure)?;

        Ok(result)
    }
}
