//! HTTP Basic authentication for admin endpoints
//!
//! The expected credentials are registered as app data
//! (`web::Data<BasicAuthCredentials>`); handlers opt in by taking an
//! `AdminAuth` argument.

use actix_web::{
    dev::Payload,
    http::{header, StatusCode},
    web, Error, FromRequest, HttpRequest,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::{ready, Ready};

use crate::json_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuthCredentials {
    pub username: String,
    pub password: String,
}

impl BasicAuthCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of an `Authorization` header carrying these credentials.
    pub fn header_value(&self) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", self.username, self.password))
        )
    }

    fn matches(&self, header_value: &str) -> bool {
        let Some(encoded) = header_value.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };
        match decoded.split_once(':') {
            Some((user, pass)) => {
                constant_time_eq(user.as_bytes(), self.username.as_bytes())
                    & constant_time_eq(pass.as_bytes(), self.password.as_bytes())
            }
            None => false,
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Proof that the request carried valid admin credentials.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(expected) = req.app_data::<web::Data<BasicAuthCredentials>>() else {
            tracing::error!("BasicAuthCredentials not registered as app data");
            return ready(Err(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Admin authentication is not configured",
            )));
        };

        let authorized = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(|value| expected.matches(value))
            .unwrap_or(false);

        if authorized {
            ready(Ok(AdminAuth))
        } else {
            ready(Err(json_error(
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid admin credentials",
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App, HttpResponse};

    async fn admin_only(_admin: AdminAuth) -> HttpResponse {
        HttpResponse::NoContent().finish()
    }

    #[::core::prelude::v1::test]
    fn test_header_value_encoding() {
        let creds = BasicAuthCredentials::new("admin", "qwerty");
        assert_eq!(creds.header_value(), "Basic YWRtaW46cXdlcnR5");
        assert!(creds.matches("Basic YWRtaW46cXdlcnR5"));
    }

    #[::core::prelude::v1::test]
    fn test_rejects_wrong_scheme_and_password() {
        let creds = BasicAuthCredentials::new("admin", "qwerty");
        assert!(!creds.matches("Bearer YWRtaW46cXdlcnR5"));
        assert!(!creds.matches(&BasicAuthCredentials::new("admin", "qwert").header_value()));
        assert!(!creds.matches("Basic !!!not-base64"));
    }

    #[actix_web::test]
    async fn test_extractor_status_codes() {
        let creds = BasicAuthCredentials::new("admin", "qwerty");
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(creds.clone()))
                .route("/admin", web::delete().to(admin_only)),
        )
        .await;

        let req = test::TestRequest::delete().uri("/admin").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri("/admin")
            .insert_header(("Authorization", creds.header_value()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }
}
