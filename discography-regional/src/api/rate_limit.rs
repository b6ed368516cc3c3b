//! Per-client request rate limiting
//!
//! Clients are keyed by the first `X-Forwarded-For` entry, falling back to the
//! peer address. Requests over quota get 429.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;
use tracing::{debug, warn};

use crate::AppState;

/// Default quota per client
pub const REQUESTS_PER_MINUTE: u32 = 10;

/// Checks between sweeps of idle client keys
const SWEEP_EVERY: u64 = 1024;

/// Keyed token-bucket limiter
///
/// Keys come from a client-supplied header, so idle keys are swept
/// periodically to keep the table bounded by recently active clients.
pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    checks: AtomicU64,
    sweep_every: u64,
}

impl ClientRateLimiter {
    /// Allow a burst of `requests` per client, refilled one token every
    /// `60 / requests` seconds
    pub fn per_minute(requests: u32) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let period = Duration::from_secs(60) / burst.get();
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);
        Self::with_quota(quota)
    }

    pub fn with_quota(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            checks: AtomicU64::new(0),
            sweep_every: SWEEP_EVERY,
        }
    }

    /// Consume one request for `client`; false when over quota
    pub fn check(&self, client: &str) -> bool {
        let checks = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if checks % self.sweep_every == 0 {
            self.sweep();
        }

        self.limiter.check_key(&client.to_string()).is_ok()
    }

    /// Drop clients whose bucket has fully refilled
    pub fn sweep(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        debug!(before, after = self.limiter.len(), "Swept idle rate limit keys");
    }

    /// Number of clients currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

impl Default for ClientRateLimiter {
    fn default() -> Self {
        Self::per_minute(REQUESTS_PER_MINUTE)
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    if !state.rate_limiter.check(&client) {
        warn!(client = %client, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too Many Requests",
                "message": "Rate limit exceeded. Try again later.",
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(client) = forwarded {
        return client.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
