//! Regional persistence
//!
//! Batches are written in a single SQLite transaction: either every entity
//! lands or none does.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use thiserror::Error;

use crate::models::RegionalEntity;

/// Persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid regional row: {0}")]
    InvalidRow(String),
}

/// Loads and saves regional entities
#[async_trait]
pub trait RegionalStore: Send + Sync {
    /// All rows with `active = true`
    async fn load_active(&self) -> Result<Vec<RegionalEntity>, StoreError>;

    /// Insert or update every entity atomically
    async fn save_all(&self, entities: &[RegionalEntity]) -> Result<(), StoreError>;
}

/// SQLite-backed regional store
#[derive(Clone)]
pub struct SqliteRegionalStore {
    pool: SqlitePool,
}

impl SqliteRegionalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every stored row, active and historical
    pub async fn list_all(&self) -> Result<Vec<RegionalEntity>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id_internal, external_id, name, active, created_at, updated_at
            FROM regionals
            ORDER BY external_id, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entity_from_row).collect()
    }
}

fn entity_from_row(row: &SqliteRow) -> Result<RegionalEntity, StoreError> {
    let id_str: String = row.try_get("id_internal")?;
    let internal_id = discography_common::uuid_utils::parse(&id_str)
        .map_err(|e| StoreError::InvalidRow(format!("id_internal {}: {}", id_str, e)))?;

    Ok(RegionalEntity {
        internal_id,
        external_id: row.try_get("external_id")?,
        name: row.try_get("name")?,
        active: row.try_get("active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

#[async_trait]
impl RegionalStore for SqliteRegionalStore {
    async fn load_active(&self) -> Result<Vec<RegionalEntity>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id_internal, external_id, name, active, created_at, updated_at
            FROM regionals
            WHERE active = 1
            ORDER BY external_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entity_from_row).collect()
    }

    async fn save_all(&self, entities: &[RegionalEntity]) -> Result<(), StoreError> {
        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await?;

        for entity in entities {
            sqlx::query(
                r#"
                INSERT INTO regionals (
                    id_internal, external_id, name, active, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(id_internal) DO UPDATE SET
                    name = excluded.name,
                    active = excluded.active,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(entity.internal_id.to_string())
            .bind(entity.external_id)
            .bind(&entity.name)
            .bind(entity.active)
            .bind(entity.created_at)
            .bind(entity.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(count = entities.len(), "Saved regional batch");
        Ok(())
    }
}
