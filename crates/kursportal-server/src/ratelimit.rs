//! Sliding-window rate limiting and request logging middleware.
//!
//! The registration endpoint is the only write endpoint open to the public,
//! so it gets a per-client sliding window: each admitted request is
//! timestamped, timestamps older than the window are purged before every
//! admission check, and a request is denied once the window holds `limit`
//! entries.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use parking_lot::Mutex;

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Sliding-window limiter
// ─────────────────────────────────────────────────────────────────────────────

/// Per-key sliding-window request counter.
#[derive(Debug, Default)]
pub struct SlidingWindowLimiter {
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a request for `key` is admissible right now; admitted
    /// requests are recorded. Purge and admission happen under one lock so
    /// concurrent callers cannot both take the last slot.
    pub fn is_allowed(&self, key: &str, limit: usize, window: Duration) -> bool {
        self.check_at(key, limit, window, Instant::now())
    }

    fn check_at(&self, key: &str, limit: usize, window: Duration, now: Instant) -> bool {
        let mut windows = self.windows.lock();

        // Trim every window while we hold the lock and drop keys with
        // nothing left, so idle clients do not pile up in the map.
        windows.retain(|_, timestamps| {
            while let Some(oldest) = timestamps.front() {
                if now.duration_since(*oldest) >= window {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }
            !timestamps.is_empty()
        });

        let timestamps = windows.entry(key.to_string()).or_default();
        if timestamps.len() >= limit {
            return false;
        }
        timestamps.push_back(now);
        true
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Rate limiting middleware for the registration endpoint.
///
/// Keys on the client IP; denied requests get a 429 without reaching the
/// handler.
pub async fn registration_rate_limit(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let limits = &state.config.rate_limit;
    let key = client_ip(&request);
    let window = Duration::from_secs(limits.registration_window_secs);

    if !state
        .limiter
        .is_allowed(&key, limits.registration_limit, window)
    {
        tracing::warn!(client = %key, "Registration rate limit exceeded");
        return Err(ServerError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Client identity for rate limiting: the first `X-Forwarded-For` hop when
/// running behind a proxy, otherwise the peer address.
fn client_ip(request: &Request<Body>) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Structured request logging middleware.
///
/// Logs request details including method, path, status, and duration.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.server.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}
