//! Admin authentication middleware
//!
//! GET requests carry `timestamp` and `hash` as query parameters; other
//! methods carry them in the JSON body. The body is buffered for hashing and
//! handed on to the handler unchanged.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use discography_common::api::auth::{validate_hash, validate_timestamp, ApiAuthError};
use discography_common::api::types::{AuthQuery, AuthRequest};
use serde_json::{json, Value};
use tracing::warn;

use crate::AppState;

/// Largest request body accepted by the gate
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Admin gate for protected routes
///
/// Returns 401 when the timestamp or hash is wrong and 400 when the auth
/// fields are missing. An admin secret of 0 disables the gate.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.admin_secret == 0 {
        return Ok(next.run(request).await);
    }

    let request = if request.method() == Method::GET {
        validate_query_auth(request, state.admin_secret)?
    } else {
        validate_body_auth(request, state.admin_secret).await?
    };

    Ok(next.run(request).await)
}

fn validate_query_auth(request: Request, secret: i64) -> Result<Request, AuthError> {
    let query = request.uri().query().unwrap_or("");
    let auth: AuthQuery = parse_auth_query(query)?;

    validate_timestamp(auth.timestamp)?;

    let json_value = json!({
        "timestamp": auth.timestamp,
        "hash": &auth.hash,
    });
    validate_hash(&auth.hash, &json_value, secret)?;

    Ok(request)
}

/// Pull `timestamp` and `hash` out of a raw query string
fn parse_auth_query(query: &str) -> Result<AuthQuery, AuthError> {
    let mut timestamp: Option<i64> = None;
    let mut hash: Option<String> = None;

    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            match key {
                "timestamp" => timestamp = value.parse::<i64>().ok(),
                "hash" => hash = Some(value.to_string()),
                _ => {}
            }
        }
    }

    Ok(AuthQuery {
        timestamp: timestamp.ok_or(AuthError::MissingFields(
            "Query parameter 'timestamp' is required".to_string(),
        ))?,
        hash: hash.ok_or(AuthError::MissingFields(
            "Query parameter 'hash' is required".to_string(),
        ))?,
    })
}

async fn validate_body_auth(request: Request, secret: i64) -> Result<Request, AuthError> {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AuthError::ParseError(format!("Failed to read body: {}", e)))?;

    let json_value: Value = serde_json::from_slice(&body_bytes)
        .map_err(|e| AuthError::ParseError(format!("Invalid JSON: {}", e)))?;

    let auth: AuthRequest = serde_json::from_value(json_value.clone())
        .map_err(|e| AuthError::MissingFields(format!("Missing auth fields: {}", e)))?;

    validate_timestamp(auth.timestamp)?;
    validate_hash(&auth.hash, &json_value, secret)?;

    Ok(Request::from_parts(parts, Body::from(body_bytes)))
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    InvalidTimestamp(String),
    InvalidHash,
    MissingFields(String),
    ParseError(String),
    Other(String),
}

impl From<ApiAuthError> for AuthError {
    fn from(e: ApiAuthError) -> Self {
        match e {
            ApiAuthError::InvalidTimestamp { reason, .. } => AuthError::InvalidTimestamp(reason),
            ApiAuthError::InvalidHash { provided, calculated } => {
                warn!(
                    "Hash validation failed: provided={}, calculated={}",
                    provided, calculated
                );
                AuthError::InvalidHash
            }
            missing @ (ApiAuthError::MissingTimestamp | ApiAuthError::MissingHash) => {
                AuthError::MissingFields(missing.to_string())
            }
            other => AuthError::Other(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::InvalidTimestamp(reason) => {
                (StatusCode::UNAUTHORIZED, format!("Invalid timestamp: {}", reason))
            }
            AuthError::InvalidHash => (StatusCode::UNAUTHORIZED, "Invalid hash".to_string()),
            AuthError::MissingFields(msg) => {
                (StatusCode::BAD_REQUEST, format!("Missing required fields: {}", msg))
            }
            AuthError::ParseError(msg) => {
                (StatusCode::BAD_REQUEST, format!("Parse error: {}", msg))
            }
            AuthError::Other(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Authentication error: {}", msg),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_parsed() {
        let auth = parse_auth_query("timestamp=1730000000000&hash=abc&page=2").unwrap();
        assert_eq!(auth.timestamp, 1730000000000);
        assert_eq!(auth.hash, "abc");
    }

    #[test]
    fn test_query_missing_hash_rejected() {
        let result = parse_auth_query("timestamp=1730000000000");
        assert!(matches!(result, Err(AuthError::MissingFields(_))));
    }
}
