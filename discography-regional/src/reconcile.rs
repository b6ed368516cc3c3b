//! Regional reconciliation
//!
//! Diffs the current external regionals against the active stored ones and
//! produces the batch of entities to write:
//!
//! - **new**: external id with no active row → create an active row
//! - **missing**: active row whose id is gone from the source → deactivate it
//! - **changed**: same id, different name → deactivate the old row and create
//!   a new active row carrying the new name
//!
//! Names are compared with exact string equality. Everything else is left
//! untouched. The pass is O(N + M) over hash-map lookups.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{RegionalEntity, RegionalRecord};

/// Input that cannot be reconciled safely
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The source listed the same external id more than once
    #[error("External source returned duplicate regional id {0}")]
    DuplicateExternalId(i32),

    /// More than one active row exists for the same external id
    #[error("Found more than one active regional with external id {0}")]
    DuplicateActiveEntity(i32),
}

/// Counts reported for one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub new: usize,
    pub inactivated: usize,
    pub changed: usize,
}

impl ReconciliationResult {
    pub fn is_noop(&self) -> bool {
        self.new == 0 && self.inactivated == 0 && self.changed == 0
    }
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Regional synchronization process completed. New: {}, Inactivated: {}, Changed: {}",
            self.new, self.inactivated, self.changed
        )
    }
}

/// Entities to persist plus the counts that produced them
#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    deactivated: Vec<RegionalEntity>,
    created: Vec<RegionalEntity>,
    result: ReconciliationResult,
}

impl ReconciliationPlan {
    pub fn result(&self) -> ReconciliationResult {
        self.result
    }

    /// True when nothing needs to be written
    pub fn is_empty(&self) -> bool {
        self.deactivated.is_empty() && self.created.is_empty()
    }

    pub fn len(&self) -> usize {
        self.deactivated.len() + self.created.len()
    }

    pub fn deactivated(&self) -> &[RegionalEntity] {
        &self.deactivated
    }

    pub fn created(&self) -> &[RegionalEntity] {
        &self.created
    }

    /// Write order: deactivations first, then creations.
    ///
    /// A renamed regional's old row must be inactive before its replacement
    /// is inserted, or the store would briefly hold two active rows for one
    /// external id.
    pub fn into_batch(self) -> Vec<RegionalEntity> {
        let mut batch = self.deactivated;
        batch.extend(self.created);
        batch
    }
}

/// Compute the changes that align `active` with `external`
pub fn reconcile(
    external: &[RegionalRecord],
    active: Vec<RegionalEntity>,
) -> Result<ReconciliationPlan, ReconcileError> {
    let mut external_ids: HashMap<i32, &RegionalRecord> = HashMap::with_capacity(external.len());
    for record in external {
        if external_ids.insert(record.external_id, record).is_some() {
            return Err(ReconcileError::DuplicateExternalId(record.external_id));
        }
    }

    let mut internal: HashMap<i32, RegionalEntity> = HashMap::with_capacity(active.len());
    for entity in active {
        let external_id = entity.external_id;
        if internal.insert(external_id, entity).is_some() {
            return Err(ReconcileError::DuplicateActiveEntity(external_id));
        }
    }

    let mut plan = ReconciliationPlan::default();

    for record in external {
        match internal.remove(&record.external_id) {
            None => {
                plan.created.push(RegionalEntity::from_record(record));
                plan.result.new += 1;
            }
            Some(mut entity) if entity.name != record.name => {
                entity.deactivate();
                plan.deactivated.push(entity);
                plan.created.push(RegionalEntity::from_record(record));
                plan.result.changed += 1;
            }
            Some(_) => {}
        }
    }

    // Anything left was not matched by the source
    for (_, mut entity) in internal {
        entity.deactivate();
        plan.deactivated.push(entity);
        plan.result.inactivated += 1;
    }

    Ok(plan)
}
