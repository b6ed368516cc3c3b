//! Shared fixtures for discography-regional integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use discography_common::api::auth::calculate_hash;
use discography_common::db::init_database_in_memory;
use discography_common::time::now_millis;
use discography_regional::api::ClientRateLimiter;
use discography_regional::models::{RegionalEntity, RegionalRecord};
use discography_regional::source::{RegionalSource, SourceError};
use discography_regional::store::{RegionalStore, SqliteRegionalStore};
use discography_regional::{build_router, AppState, RegionalSyncService};
use serde_json::{json, Value};

/// Source whose next answer is set by the test
#[derive(Default)]
pub struct ScriptedSource {
    response: Mutex<Option<Result<Vec<RegionalRecord>, String>>>,
}

impl ScriptedSource {
    pub fn returning(records: Vec<RegionalRecord>) -> Arc<Self> {
        let source = Arc::new(Self::default());
        source.set_records(records);
        source
    }

    pub fn set_records(&self, records: Vec<RegionalRecord>) {
        *self.response.lock().unwrap() = Some(Ok(records));
    }

    pub fn fail_with(&self, message: &str) {
        *self.response.lock().unwrap() = Some(Err(message.to_string()));
    }
}

#[async_trait]
impl RegionalSource for ScriptedSource {
    async fn fetch_all(&self) -> Result<Vec<RegionalRecord>, SourceError> {
        match self.response.lock().unwrap().clone() {
            Some(Ok(records)) => Ok(records),
            Some(Err(message)) => Err(SourceError::Network(message)),
            None => Ok(Vec::new()),
        }
    }
}

pub async fn setup_store() -> SqliteRegionalStore {
    let pool = init_database_in_memory()
        .await
        .expect("Failed to create in-memory database");
    SqliteRegionalStore::new(pool)
}

/// Store seeded with active regionals
pub async fn seeded_store(regionals: &[(i32, &str)]) -> SqliteRegionalStore {
    let store = setup_store().await;
    let entities: Vec<RegionalEntity> = regionals
        .iter()
        .map(|(id, name)| RegionalEntity::new(*id, *name))
        .collect();
    store.save_all(&entities).await.expect("Failed to seed regionals");
    store
}

pub fn setup_state(
    source: Arc<ScriptedSource>,
    store: SqliteRegionalStore,
    admin_secret: i64,
) -> AppState {
    let service = Arc::new(RegionalSyncService::new(source, Arc::new(store.clone())));
    AppState::new(service, store, admin_secret)
}

/// Router with auth disabled and the default rate limit
pub fn setup_app(source: Arc<ScriptedSource>, store: SqliteRegionalStore) -> Router {
    build_router(setup_state(source, store, 0))
}

pub fn setup_app_with_limit(
    source: Arc<ScriptedSource>,
    store: SqliteRegionalStore,
    requests_per_minute: u32,
) -> Router {
    build_router(
        setup_state(source, store, 0)
            .with_rate_limiter(ClientRateLimiter::per_minute(requests_per_minute)),
    )
}

pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// POST request carrying a freshly signed auth body
pub fn signed_post(uri: &str, secret: i64) -> Request<Body> {
    let mut body = json!({ "timestamp": now_millis(), "hash": "" });
    let hash = calculate_hash(&body, secret);
    body["hash"] = Value::String(hash);

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// GET request carrying freshly signed auth query parameters
pub fn signed_get(path: &str, secret: i64) -> Request<Body> {
    let timestamp = now_millis();
    let hash = calculate_hash(&json!({ "timestamp": timestamp, "hash": "" }), secret);
    test_request("GET", &format!("{}?timestamp={}&hash={}", path, timestamp, hash))
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub fn record(external_id: i32, name: &str) -> RegionalRecord {
    RegionalRecord::new(external_id, name)
}
