use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use uuid::Uuid;

use crate::json_error;

/// User ID extracted from a valid access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Caller identity on endpoints where authentication is optional.
///
/// Missing, malformed and expired tokens all resolve to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalUserId(pub Option<Uuid>);

fn unauthorized(message: &str) -> Error {
    json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
}

/// Resolve the bearer token of a request into a user id.
fn authenticate(req: &HttpRequest) -> Result<UserId, Error> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

    let token_data = crypto_core::jwt::validate_access_token(token).map_err(|e| {
        tracing::debug!("JWT validation failed: {}", e);
        unauthorized("Invalid or expired token")
    })?;

    let user_id = token_data.claims.user_id().map_err(|e| {
        tracing::error!("Invalid user_id UUID in token: {}", e);
        unauthorized("Invalid token: malformed user_id")
    })?;

    Ok(UserId(user_id))
}

/// JWT Authentication Middleware
///
/// Rejects requests without a valid bearer access token and stores the
/// caller's `UserId` in request extensions.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            match authenticate(req.request()) {
                Ok(user_id) => {
                    req.extensions_mut().insert(user_id);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Uses the id stored by `JwtAuthMiddleware` when present, otherwise
/// validates the bearer token itself.
impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(user_id) = req.extensions().get::<UserId>() {
            return ready(Ok(*user_id));
        }
        ready(authenticate(req))
    }
}

impl FromRequest for OptionalUserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(user_id) = req.extensions().get::<UserId>() {
            return ready(Ok(OptionalUserId(Some(user_id.0))));
        }
        ready(Ok(OptionalUserId(authenticate(req).ok().map(|u| u.0))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};
    use crypto_core::jwt::{generate_access_token, initialize_jwt_keys, JwtSettings};

    fn init_test_keys() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            initialize_jwt_keys(JwtSettings {
                access_secret: "middleware-access-secret".into(),
                refresh_secret: "middleware-refresh-secret".into(),
                access_ttl_secs: 60,
                refresh_ttl_secs: 120,
            })
            .expect("Failed to initialize test keys");
        });
    }

    async fn whoami(user: UserId) -> HttpResponse {
        HttpResponse::Ok().body(user.0.to_string())
    }

    async fn maybe(user: OptionalUserId) -> HttpResponse {
        match user.0 {
            Some(id) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn test_middleware_rejects_missing_header() {
        init_test_keys();
        let app = test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(JwtAuthMiddleware)
                    .route(web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_middleware_accepts_valid_token() {
        init_test_keys();
        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id).unwrap();
        let app = test::init_service(
            App::new().service(
                web::resource("/me")
                    .wrap(JwtAuthMiddleware)
                    .route(web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, user_id.to_string());
    }

    #[actix_web::test]
    async fn test_extractor_without_middleware_rejects_garbage() {
        init_test_keys();
        let app = test::init_service(App::new().route("/me", web::get().to(whoami))).await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_optional_user_falls_back_to_anonymous() {
        init_test_keys();
        let app = test::init_service(App::new().route("/maybe", web::get().to(maybe))).await;

        let req = test::TestRequest::get()
            .uri("/maybe")
            .insert_header(("Authorization", "Bearer expired.or.bogus"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "anonymous");

        let user_id = Uuid::new_v4();
        let token = generate_access_token(user_id).unwrap();
        let req = test::TestRequest::get()
            .uri("/maybe")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, user_id.to_string());
    }
}
