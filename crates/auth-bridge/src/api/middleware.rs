//! Rate limiting and request logging.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc};
use tracing::{debug, warn};

/// Global rate limiter (not keyed by client).
pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const FALLBACK_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(120) {
    Some(n) => n,
    None => unreachable!(),
};

/// Rate limiter shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    pub global: Arc<GlobalLimiter>,
}

impl RateLimitState {
    /// Zero falls back to the default quota.
    pub fn new(requests_per_minute: u32) -> Self {
        let quota =
            Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(FALLBACK_PER_MINUTE));

        Self {
            global: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create a permissive rate limiter for testing.
    pub fn permissive() -> Self {
        Self::new(10_000)
    }
}

/// Rejects with 429 once the global quota is spent.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if rate_limit.global.check().is_err() {
        warn!("Global rate limit exceeded");
        return Err(ApiError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Logging middleware for requests.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = redacted_path(request.uri().path());
    let start = std::time::Instant::now();

    debug!(%method, %path, "Request started");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_success() {
        debug!(%method, %path, %status, ?duration, "Request completed");
    } else {
        warn!(%method, %path, %status, ?duration, "Request failed");
    }

    response
}

/// Request path with handshake tokens masked, safe for logs.
pub fn redacted_path(path: &str) -> String {
    match path.strip_prefix("/auth/check/") {
        Some(token) if !token.is_empty() => "/auth/check/{token}".to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_exhaustion() {
        let state = RateLimitState::new(1);

        assert!(state.global.check().is_ok());
        assert!(state.global.check().is_err());
    }

    #[test]
    fn test_zero_quota_falls_back() {
        let state = RateLimitState::new(0);
        for _ in 0..100 {
            assert!(state.global.check().is_ok());
        }
    }

    #[test]
    fn test_redacted_path() {
        assert_eq!(redacted_path("/auth/check/0a1b2c3d4e5f"), "/auth/check/{token}");
        assert_eq!(redacted_path("/auth/check/"), "/auth/check/");
        assert_eq!(redacted_path("/auth/request"), "/auth/request");
        assert_eq!(redacted_path("/health"), "/health");
    }
}
