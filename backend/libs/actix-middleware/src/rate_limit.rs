//! Per-client, per-endpoint rate limiting
//!
//! Each (client IP, request path) pair gets its own GCRA bucket from the
//! `governor` crate: `max_requests` may arrive back to back, after which
//! capacity refills evenly over `window_seconds`.
//!
//! Construct the middleware once and clone it into every worker so all
//! workers share the same buckets. Call `retain_recent` periodically to drop
//! buckets that have fully refilled.
//!
//! The client IP is the socket peer address. `X-Forwarded-For` is only read
//! when `trust_forwarded_for` is set, i.e. when a reverse proxy in front of
//! the service overwrites that header.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::json_error;

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_seconds: u64,
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_seconds: 10,
            trust_forwarded_for: false,
        }
    }
}

impl RateLimitConfig {
    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        let window = Duration::from_secs(self.window_seconds.max(1));
        Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst)
    }
}

type KeyedLimiter = DefaultKeyedRateLimiter<String>;

#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<KeyedLimiter>,
    trust_forwarded_for: bool,
}

impl RateLimitMiddleware {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::keyed(config.quota())),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Drop buckets that are indistinguishable from fresh ones
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of (client, path) buckets currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: RateLimitMiddleware,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ip = client_ip(req.request(), self.limiter.trust_forwarded_for);
        let key = format!("{}|{}", ip, req.path());

        if !self.limiter.check(&key) {
            tracing::warn!(client_ip = %ip, path = %req.path(), "Rate limit exceeded");
            let response = json_error(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMIT_EXCEEDED",
                "Too many requests, try again later",
            )
            .error_response();
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        let service = self.service.clone();
        Box::pin(async move {
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Client IP. The first `X-Forwarded-For` entry wins only when
/// `trust_forwarded_for` is set; otherwise the socket peer is used.
pub fn client_ip(req: &HttpRequest, trust_forwarded_for: bool) -> IpAddr {
    if let Some(x_forwarded_for) = req
        .headers()
        .get("X-Forwarded-For")
        .filter(|_| trust_forwarded_for)
    {
        if let Ok(header_value) = x_forwarded_for.to_str() {
            // X-Forwarded-For can contain multiple IPs; take the first one
            if let Some(first_ip) = header_value.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}
