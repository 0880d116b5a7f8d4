/// HTTP handlers, one module per resource
use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::{error::JsonPayloadError, error::QueryPayloadError, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::auth::ClientInfo;

pub mod auth;
pub mod blogs;
pub mod comments;
pub mod devices;
pub mod health;
pub mod posts;
pub mod testing;
pub mod users;

pub const REFRESH_COOKIE: &str = "refreshToken";

const MAX_DEVICE_TITLE_LEN: usize = 255;

/// Path id that does not parse can never name a stored row
pub(crate) fn path_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    crate::validators::parse_id(raw).ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
}

pub(crate) fn refresh_cookie(token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token.to_string())
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

pub(crate) fn expired_refresh_cookie() -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, "")
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .finish()
}

pub(crate) fn refresh_token_of(req: &HttpRequest) -> Option<String> {
    req.cookie(REFRESH_COOKIE).map(|c| c.value().to_string())
}

/// Device session title and IP taken from the request
pub(crate) fn client_info(req: &HttpRequest, trust_forwarded_for: bool) -> ClientInfo {
    let title = req
        .headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown device")
        .chars()
        .take(MAX_DEVICE_TITLE_LEN)
        .collect();

    ClientInfo {
        ip: actix_middleware::client_ip(req, trust_forwarded_for).to_string(),
        title,
    }
}

/// Malformed JSON bodies answer with the validation error shape
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "rejected request body");
    AppError::field("body", err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::field("query", err.to_string()).into()
}
