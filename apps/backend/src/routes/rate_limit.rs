//! Per-client-IP sliding-window rate limiting middleware
//!
//! Runs before handler logic and independently of any database
//! transaction. A limit of 0 disables the check.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Sliding-window hit counter keyed by client address.
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Record a hit for `key`. Over the limit returns the seconds until
    /// the oldest hit leaves the window.
    pub async fn check(&self, key: &str) -> std::result::Result<(), u64> {
        if self.limit == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let mut hits = self.hits.lock().await;
        let entry = hits.entry(key.to_string()).or_default();

        while let Some(oldest) = entry.front() {
            if now.duration_since(*oldest) >= self.window {
                entry.pop_front();
            } else {
                break;
            }
        }

        if entry.len() >= self.limit {
            let oldest = entry.front().copied().unwrap_or(now);
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(oldest))
                .as_secs()
                .max(1);
            return Err(retry_after);
        }

        entry.push_back(now);
        Ok(())
    }
}

/// Rate-limit middleware applied ahead of every handler.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let key = client_key(&request);
    if let Err(retry_after) = state.rate_limiter.check(&key).await {
        tracing::warn!("rate limit exceeded for {key}");
        return Err(ApiError::RateLimited { retry_after });
    }

    Ok(next.run(request).await)
}

/// Client key: first X-Forwarded-For entry, else the peer address,
/// else a shared fallback bucket.
fn client_key(request: &Request<Body>) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limiter_blocks_over_limit() {
        let limiter = RateLimiter::per_minute(2);

        assert!(limiter.check("10.0.0.1").await.is_ok());
        assert!(limiter.check("10.0.0.1").await.is_ok());

        let retry_after = limiter.check("10.0.0.1").await.unwrap_err();
        assert!((1..=60).contains(&retry_after));
    }

    #[tokio::test]
    async fn test_limiter_keys_are_independent() {
        let limiter = RateLimiter::per_minute(1);

        assert!(limiter.check("10.0.0.1").await.is_ok());
        assert!(limiter.check("10.0.0.2").await.is_ok());
        assert!(limiter.check("10.0.0.1").await.is_err());
    }

    #[tokio::test]
    async fn test_limiter_window_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));

        assert!(limiter.check("10.0.0.1").await.is_ok());
        assert!(limiter.check("10.0.0.1").await.is_err());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.check("10.0.0.1").await.is_ok());
    }

    #[tokio::test]
    async fn test_zero_limit_disables() {
        let limiter = RateLimiter::per_minute(0);
        for _ in 0..100 {
            assert!(limiter.check("10.0.0.1").await.is_ok());
        }
    }
}
