//! Fixed-window rate limiting for the login routes
//!
//! Counters are keyed by `(rule, client ip)` and kept in memory; a single
//! server instance is assumed.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::AppState;

/// Counters untouched for this long are dropped by [`RateLimiter::cleanup`]
const IDLE_TTL: Duration = Duration::from_secs(300);

/// Attempts allowed per client within one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoginRule {
    pub name: &'static str,
    pub max_attempts: u32,
    pub window: Duration,
}

/// Staff login (email + password): 5 per minute
pub const STAFF_LOGIN: LoginRule = LoginRule {
    name: "login",
    max_attempts: 5,
    window: Duration::from_secs(60),
};

/// QR-table customer login: 20 per minute, a whole table scans at once
pub const CUSTOMER_LOGIN: LoginRule = LoginRule {
    name: "customer_login",
    max_attempts: 20,
    window: Duration::from_secs(60),
};

struct Window {
    opened: Instant,
    hits: u32,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<(&'static str, String), Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempt; `false` once the client is over the rule's limit
    pub async fn allow(&self, rule: &LoginRule, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry((rule.name, client.to_owned()))
            .or_insert(Window { opened: now, hits: 0 });

        if now.duration_since(window.opened) >= rule.window {
            window.opened = now;
            window.hits = 0;
        }
        window.hits += 1;
        window.hits <= rule.max_attempts
    }

    pub async fn cleanup(&self) {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .retain(|_, w| now.duration_since(w.opened) < IDLE_TTL);
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// Client address: first `X-Forwarded-For` hop, else the peer address
fn client_ip(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_owned();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Middleware enforcing `rule`; mount with
/// `from_fn_with_state((state, rule), limit_login)`
pub async fn limit_login(
    State((state, rule)): State<(AppState, LoginRule)>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request);
    if !state.rate_limiter.allow(&rule, &ip).await {
        tracing::warn!(ip = %ip, rule = rule.name, "Login rate limit exceeded");
        return Err(AppError::new(ErrorCode::TooManyRequests));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn limits_are_per_rule_and_client() {
        let limiter = RateLimiter::new();
        for _ in 0..5 {
            assert!(limiter.allow(&STAFF_LOGIN, "10.0.0.1").await);
        }
        assert!(!limiter.allow(&STAFF_LOGIN, "10.0.0.1").await);
        assert!(limiter.allow(&STAFF_LOGIN, "10.0.0.2").await);
        assert!(limiter.allow(&CUSTOMER_LOGIN, "10.0.0.1").await);
    }

    #[tokio::test]
    async fn elapsed_window_starts_over() {
        let limiter = RateLimiter::new();
        let instant = LoginRule {
            name: "test",
            max_attempts: 1,
            window: Duration::ZERO,
        };
        assert!(limiter.allow(&instant, "10.0.0.1").await);
        assert!(limiter.allow(&instant, "10.0.0.1").await);

        limiter.allow(&CUSTOMER_LOGIN, "10.0.0.2").await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked().await, 2);
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.7");

        let req = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(client_ip(&req), "unknown");
    }
}
