//! Admin API authentication via timestamp and hash validation
//!
//! # Scheme
//!
//! - Every protected request carries a timestamp (i64 Unix epoch ms) and a
//!   hash (SHA-256, 64 hex chars)
//! - Timestamp must be within 1000ms in the past and 1ms in the future
//! - Hash is calculated from canonical JSON plus the admin secret
//! - Admin secret lives in the `settings` table unless configured explicitly
//! - A secret of 0 disables checking entirely

use serde_json::Value;
use sha2::{Digest, Sha256};

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

use crate::time::now_millis;

/// Settings key holding the admin secret
pub const ADMIN_SECRET_KEY: &str = "admin_shared_secret";

/// Placeholder substituted for the hash field before hashing
const DUMMY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Maximum accepted age of a request timestamp
const MAX_PAST_MS: i64 = 1000;

/// Maximum accepted clock skew into the future
const MAX_FUTURE_MS: i64 = 1;

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    #[error("Invalid hash")]
    InvalidHash { provided: String, calculated: String },

    #[error("Missing timestamp field")]
    MissingTimestamp,

    #[error("Missing hash field")]
    MissingHash,

    /// Database error loading the admin secret
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Failed to parse request body
    #[error("Parse error: {0}")]
    ParseError(String),
}

// ========================================
// Admin Secret Management
// ========================================

/// Load the admin secret from database settings
///
/// Generates and stores a new secret when none exists yet.
#[cfg(feature = "sqlx")]
pub async fn load_admin_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(ADMIN_SECRET_KEY)
        .fetch_optional(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_admin_secret(db).await,
    }
}

/// Generate a random non-zero admin secret and store it
#[cfg(feature = "sqlx")]
pub async fn initialize_admin_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(ADMIN_SECRET_KEY)
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Timestamp Validation
// ========================================

/// Validate a request timestamp against the current clock
///
/// # Examples
///
/// ```
/// use discography_common::api::auth::validate_timestamp;
/// use discography_common::time::now_millis;
///
/// let now = now_millis();
/// assert!(validate_timestamp(now).is_ok());
/// assert!(validate_timestamp(now - 500).is_ok());
/// assert!(validate_timestamp(now - 2000).is_err());
/// ```
pub fn validate_timestamp(timestamp: i64) -> Result<(), ApiAuthError> {
    validate_timestamp_at(timestamp, now_millis())
}

fn validate_timestamp_at(timestamp: i64, now: i64) -> Result<(), ApiAuthError> {
    let diff = now - timestamp;

    if diff > MAX_PAST_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("Timestamp {}ms too old (max {}ms past)", diff, MAX_PAST_MS),
        });
    }

    if diff < -MAX_FUTURE_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                diff.abs(),
                MAX_FUTURE_MS
            ),
        });
    }

    Ok(())
}

// ========================================
// Hash Calculation and Validation
// ========================================

/// Calculate the request hash
///
/// 1. Replace the hash field with 64 zeros
/// 2. Render canonical JSON (sorted keys, no whitespace)
/// 3. Append the secret as a decimal string
/// 4. SHA-256, rendered as 64 hex characters
///
/// # Examples
///
/// ```
/// use discography_common::api::auth::calculate_hash;
/// use serde_json::json;
///
/// let json = json!({ "timestamp": 1730000000000i64, "hash": "dummy" });
/// let hash = calculate_hash(&json, 123456789);
/// assert_eq!(hash.len(), 64);
/// ```
pub fn calculate_hash(json_value: &Value, secret: i64) -> String {
    let mut value = json_value.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(DUMMY_HASH.to_string()));
    }

    let to_hash = format!("{}{}", to_canonical_json(&value), secret);

    let mut hasher = Sha256::new();
    hasher.update(to_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("\"{}\":{}", k, to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Validate that the provided hash matches the calculated value
pub fn validate_hash(provided_hash: &str, json_value: &Value, secret: i64) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(json_value, secret);

    if provided_hash != calculated {
        return Err(ApiAuthError::InvalidHash {
            provided: provided_hash.to_string(),
            calculated,
        });
    }

    Ok(())
}
