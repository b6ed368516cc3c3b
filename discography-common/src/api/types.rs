//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Authentication parameters for GET requests (query parameters)
///
/// ```
/// // GET /api/v1/regionals?timestamp=1730000000000&hash=abc123...
/// use discography_common::api::types::AuthQuery;
///
/// let query = AuthQuery {
///     timestamp: 1730000000000,
///     hash: "abc123...".to_string(),
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthQuery {
    /// Unix epoch time in milliseconds
    pub timestamp: i64,

    /// SHA-256 hash (64 hex chars)
    pub hash: String,
}

/// Authentication-only request body for POST requests without a payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthRequest {
    /// Unix epoch time in milliseconds
    pub timestamp: i64,

    /// SHA-256 hash (64 hex chars)
    pub hash: String,
}

/// JSON error body shared by all services
///
/// Serialized as `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
