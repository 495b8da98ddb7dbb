//! Per-client request limiting for the API prefix.
//!
//! Each client IP gets a fixed window of `max_requests` requests. Responses
//! carry `RateLimit-Limit`, `RateLimit-Remaining` and `RateLimit-Reset`; once
//! the window is spent the client receives 429 until it resets. `OPTIONS`
//! requests are never counted.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::error::ApiError;

/// Expired windows are swept once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of counting one request against its client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Keyed by client IP; `None` when the peer address is unknown.
    clients: DashMap<Option<IpAddr>, Window>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: DashMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.max_requests > 0
    }

    /// Counts a request from `client` at `now`.
    pub fn check(&self, client: Option<IpAddr>, now: Instant) -> Quota {
        let limit = self.config.max_requests;
        let window = self.config.window;

        if self.clients.len() > SWEEP_THRESHOLD {
            self.clients
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let mut entry = self.clients.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let allowed = entry.count < limit;
        if allowed {
            entry.count += 1;
        }

        Quota {
            allowed,
            limit,
            remaining: limit.saturating_sub(entry.count),
            reset_after: window.saturating_sub(now.saturating_duration_since(entry.started)),
        }
    }
}

pub async fn limit_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.is_enabled() || request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let quota = limiter.check(client, Instant::now());

    let mut response = if quota.allowed {
        next.run(request).await
    } else {
        tracing::warn!(
            "Rate limit exceeded for {} on {}",
            client.map_or_else(|| "unknown client".to_string(), |ip| ip.to_string()),
            request.uri().path()
        );
        ApiError::RateLimited.into_response()
    };

    insert_quota_headers(response.headers_mut(), &quota);
    response
}

fn insert_quota_headers(headers: &mut HeaderMap, quota: &Quota) {
    let reset_secs = quota.reset_after.as_secs_f64().ceil() as u64;
    headers.insert("ratelimit-limit", HeaderValue::from(quota.limit));
    headers.insert("ratelimit-remaining", HeaderValue::from(quota.remaining));
    headers.insert("ratelimit-reset", HeaderValue::from(reset_secs));
}
