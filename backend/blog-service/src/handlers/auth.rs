use actix_middleware::UserId;
use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::error::Result;
use crate::handlers::{client_info, expired_refresh_cookie, refresh_cookie, refresh_token_of};
use crate::models::auth::{
    AccessTokenView, ConfirmationInput, EmailInput, LoginInput, NewPasswordInput, TokenPair,
};
use crate::models::UserInput;
use crate::services::auth_service;
use crate::AppState;

/// 200 with the access token in the body and the refresh token as a cookie
fn token_response(pair: TokenPair) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(refresh_cookie(&pair.refresh_token, pair.refresh_expires_in))
        .json(AccessTokenView {
            access_token: pair.access_token,
        })
}

/// POST /auth/login
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<LoginInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let client = client_info(&req, state.config.rate_limit.trust_forwarded_for);
    let pair = auth_service::login(&state.db, &body, client).await?;
    Ok(token_response(pair))
}

/// POST /auth/refresh-token
pub async fn refresh_token(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let token = refresh_token_of(&req);
    let ip = client_info(&req, state.config.rate_limit.trust_forwarded_for).ip;
    let pair = auth_service::refresh(&state.db, token.as_deref(), &ip).await?;
    Ok(token_response(pair))
}

/// POST /auth/logout
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let token = refresh_token_of(&req);
    auth_service::logout(&state.db, token.as_deref()).await?;
    Ok(HttpResponse::NoContent()
        .cookie(expired_refresh_cookie())
        .finish())
}

/// POST /auth/registration
pub async fn registration(
    state: web::Data<AppState>,
    body: web::Json<UserInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    auth_service::register(&state, &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /auth/registration-confirmation
pub async fn registration_confirmation(
    state: web::Data<AppState>,
    body: web::Json<ConfirmationInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    auth_service::confirm_registration(&state.db, &body.code).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /auth/registration-email-resending
pub async fn registration_email_resending(
    state: web::Data<AppState>,
    body: web::Json<EmailInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    auth_service::resend_confirmation(&state, &body.email).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /auth/password-recovery
pub async fn password_recovery(
    state: web::Data<AppState>,
    body: web::Json<EmailInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    auth_service::password_recovery(&state, &body.email).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /auth/new-password
pub async fn new_password(
    state: web::Data<AppState>,
    body: web::Json<NewPasswordInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    auth_service::new_password(&state.db, &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /auth/me
pub async fn me(user: UserId, state: web::Data<AppState>) -> Result<HttpResponse> {
    let me = auth_service::me(&state.db, user.0).await?;
    Ok(HttpResponse::Ok().json(me))
}
