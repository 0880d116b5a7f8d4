//! # Actix Middleware Library
//!
//! Request guards and instrumentation shared by the blogger platform services
//!
//! ## Modules
//! - `jwt_auth`: Bearer access-token middleware and user extractors
//! - `basic_auth`: HTTP Basic guard for admin endpoints
//! - `rate_limit`: In-process per-IP, per-endpoint rate limiting
//! - `metrics`: Prometheus request metrics

use actix_web::{http::StatusCode, HttpResponse};

pub mod basic_auth;
pub mod jwt_auth;
pub mod metrics;
pub mod rate_limit;

pub use basic_auth::{AdminAuth, BasicAuthCredentials};
pub use jwt_auth::{JwtAuthMiddleware, OptionalUserId, UserId};
pub use metrics::MetricsMiddleware;
pub use rate_limit::{client_ip, RateLimitConfig, RateLimitMiddleware};

/// Build an actix error whose response carries the shared JSON error body.
pub(crate) fn json_error(status: StatusCode, code: &str, message: &str) -> actix_web::Error {
    let response = HttpResponse::build(status).json(serde_json::json!({
        "error": code,
        "message": message,
    }));
    actix_web::error::InternalError::from_response(message.to_string(), response).into()
}
