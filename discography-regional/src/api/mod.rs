//! HTTP API handlers for discography-regional

pub mod auth;
pub mod health;
pub mod rate_limit;
pub mod regionals;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use rate_limit::{rate_limit_middleware, ClientRateLimiter};
pub use regionals::{list_active_regionals, list_regional_history, sync_regionals};
