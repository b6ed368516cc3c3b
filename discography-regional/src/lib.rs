//! discography-regional library
//!
//! Regional reference-data synchronization: the reconciler, its source and
//! store collaborators, the sync service with its scheduler, and the
//! administrative HTTP surface.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod scheduler;
pub mod source;
pub mod store;
pub mod sync;

pub use crate::error::{ApiError, ApiResult};
pub use crate::reconcile::{reconcile, ReconciliationPlan, ReconciliationResult};
pub use crate::sync::{RegionalSyncService, SyncError};

use crate::api::ClientRateLimiter;
use crate::store::SqliteRegionalStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Serialized sync runner
    pub sync_service: Arc<RegionalSyncService>,
    /// Read access for the listing endpoints
    pub store: SqliteRegionalStore,
    /// Admin secret for protected endpoints (0 disables the check)
    pub admin_secret: i64,
    /// Per-client request limiter for the API routes
    pub rate_limiter: Arc<ClientRateLimiter>,
}

impl AppState {
    pub fn new(
        sync_service: Arc<RegionalSyncService>,
        store: SqliteRegionalStore,
        admin_secret: i64,
    ) -> Self {
        Self {
            sync_service,
            store,
            admin_secret,
            rate_limiter: Arc::new(ClientRateLimiter::default()),
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: ClientRateLimiter) -> Self {
        self.rate_limiter = Arc::new(rate_limiter);
        self
    }
}

/// Build application router
///
/// `/health` is public. Every `/api` route is rate limited first and then
/// checked by the admin gate.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/v1/regionals/sync", post(api::sync_regionals))
        .route("/api/v1/regionals", get(api::list_active_regionals))
        .route("/api/v1/regionals/history", get(api::list_regional_history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::rate_limit_middleware,
        ));

    Router::new()
        .merge(protected)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
