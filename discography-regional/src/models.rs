//! Regional records and entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A regional as published by the external system of record
///
/// Wire format is `{"id": 101, "nome": "Regional A"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegionalRecord {
    #[serde(rename = "id")]
    pub external_id: i32,
    #[serde(rename = "nome")]
    pub name: String,
}

impl RegionalRecord {
    pub fn new(external_id: i32, name: impl Into<String>) -> Self {
        Self {
            external_id,
            name: name.into(),
        }
    }
}

/// A stored regional row
///
/// Rows are never deleted. A name change or a disappearance from the source
/// flips `active` off; a rename also creates a fresh row with a new
/// `internal_id` for the same `external_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalEntity {
    pub internal_id: Uuid,
    pub external_id: i32,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RegionalEntity {
    /// Create a new active entity with a fresh internal id
    pub fn new(external_id: i32, name: impl Into<String>) -> Self {
        let now = discography_common::time::now();
        Self {
            internal_id: discography_common::uuid_utils::generate(),
            external_id,
            name: name.into(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_record(record: &RegionalRecord) -> Self {
        Self::new(record.external_id, record.name.clone())
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.touch();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = discography_common::time::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_is_active_with_matching_timestamps() {
        let entity = RegionalEntity::new(101, "Regional A");

        assert!(entity.active);
        assert_eq!(entity.external_id, 101);
        assert_eq!(entity.name, "Regional A");
        assert_eq!(entity.created_at, entity.updated_at);
    }

    #[test]
    fn test_new_entities_never_share_internal_ids() {
        let a = RegionalEntity::new(101, "Regional A");
        let b = RegionalEntity::new(101, "Regional A");
        assert_ne!(a.internal_id, b.internal_id);
    }

    #[test]
    fn test_deactivate_keeps_identity_and_bumps_updated_at() {
        let mut entity = RegionalEntity::new(102, "Regional B");
        let original = entity.clone();

        entity.deactivate();

        assert!(!entity.active);
        assert_eq!(entity.internal_id, original.internal_id);
        assert_eq!(entity.created_at, original.created_at);
        assert!(entity.updated_at >= original.updated_at);

        entity.activate();
        assert!(entity.active);
    }

    #[test]
    fn test_record_wire_format() {
        let records: Vec<RegionalRecord> =
            serde_json::from_str(r#"[{"id": 101, "nome": "Regional A"}]"#).unwrap();

        assert_eq!(records, vec![RegionalRecord::new(101, "Regional A")]);
    }
}
