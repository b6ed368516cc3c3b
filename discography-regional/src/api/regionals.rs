//! Regional administration endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;
use crate::models::RegionalEntity;
use crate::reconcile::ReconciliationResult;
use crate::store::RegionalStore;
use crate::AppState;

/// Successful sync response
///
/// `message` is the human-readable summary; the counts are repeated as
/// numbers for programmatic callers.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub message: String,
    #[serde(flatten)]
    pub result: ReconciliationResult,
}

/// POST /api/v1/regionals/sync
pub async fn sync_regionals(State(state): State<AppState>) -> ApiResult<Json<SyncResponse>> {
    info!("Regional synchronization triggered via API");

    let result = state.sync_service.sync().await?;

    Ok(Json(SyncResponse {
        message: result.to_string(),
        result,
    }))
}

/// GET /api/v1/regionals
pub async fn list_active_regionals(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RegionalEntity>>> {
    Ok(Json(state.store.load_active().await?))
}

/// GET /api/v1/regionals/history
///
/// Every stored row, including deactivated ones.
pub async fn list_regional_history(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RegionalEntity>>> {
    Ok(Json(state.store.list_all().await?))
}
