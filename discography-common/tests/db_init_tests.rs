//! Tests for database initialization

use discography_common::api::auth::{load_admin_secret, ADMIN_SECRET_KEY};
use discography_common::db::init::{init_database, BUSY_TIMEOUT_MS};
use discography_common::db::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("discography.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("discography.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
    assert_eq!(
        get_schema_version(&pool2.unwrap()).await.unwrap(),
        CURRENT_SCHEMA_VERSION
    );
}

#[tokio::test]
async fn test_admin_secret_generated_once() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("discography.db")).await.unwrap();

    let first = load_admin_secret(&pool).await.unwrap();
    let second = load_admin_secret(&pool).await.unwrap();

    assert_ne!(first, 0);
    assert_eq!(first, second);

    let stored: String = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(ADMIN_SECRET_KEY)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, first.to_string());
}

#[tokio::test]
async fn test_every_pooled_connection_has_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("discography.db")).await.unwrap();

    // Hold several connections at once so the pool must open new ones
    let mut held = Vec::new();
    for _ in 0..3 {
        held.push(pool.acquire().await.unwrap());
    }

    for conn in held.iter_mut() {
        let timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(timeout, BUSY_TIMEOUT_MS as i64);

        let journal_mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&mut **conn)
            .await
            .unwrap();
        assert_eq!(journal_mode.to_lowercase(), "wal");
    }
}
