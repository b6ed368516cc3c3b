//! Shared HTTP API functionality
//!
//! Contains ONLY pure functions, database operations and shared types. Each
//! service wraps these with its own framework-specific middleware.

pub mod auth;
pub mod types;

pub use auth::{
    calculate_hash, initialize_admin_secret, load_admin_secret, validate_hash,
    validate_timestamp, ApiAuthError,
};
pub use types::{AuthQuery, AuthRequest, ErrorResponse};
