//! HTTP error mapping for discography-regional

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use discography_common::api::ErrorResponse;
use thiserror::Error;

use crate::store::StoreError;
use crate::sync::SyncError;

/// Prefix on every failed sync message returned to the caller
const SYNC_ERROR_PREFIX: &str = "Error during regional synchronization: ";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Sync run failed (status depends on the cause)
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Reading regionals failed (500)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Sync(SyncError::AlreadyRunning) => (StatusCode::CONFLICT, "SYNC_IN_PROGRESS"),
            ApiError::Sync(SyncError::SourceUnavailable(_)) => {
                (StatusCode::BAD_GATEWAY, "SOURCE_UNAVAILABLE")
            }
            ApiError::Sync(SyncError::InvalidSourceData(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_SOURCE_DATA")
            }
            ApiError::Sync(SyncError::PersistenceFailure(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_FAILURE")
            }
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::Sync(e) => format!("{}{}", SYNC_ERROR_PREFIX, e),
            ApiError::Store(e) => e.to_string(),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ReconcileError;
    use crate::source::SourceError;

    #[test]
    fn test_sync_errors_map_to_status() {
        let cases = [
            (SyncError::AlreadyRunning, StatusCode::CONFLICT),
            (
                SyncError::SourceUnavailable(SourceError::Network("timeout".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                SyncError::InvalidSourceData(ReconcileError::DuplicateExternalId(1)),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                SyncError::PersistenceFailure(StoreError::InvalidRow("bad".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), expected);
        }
    }
}
