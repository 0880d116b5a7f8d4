/// Registration, sign-in and refresh-token sessions
///
/// Every successful sign-in creates a device session. The refresh token
/// issued for it carries the session's `device_id` and a `jti` that must
/// match the session's current `token_id`; refreshing swaps both the token
/// and the stored id, so a refresh token is accepted at most once.
use chrono::{DateTime, Utc};
use crypto_core::jwt::{self, RefreshClaims};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{device_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{
    auth::{ClientInfo, LoginInput, NewPasswordInput, TokenPair},
    DeviceSession, MeView, UserInput,
};
use crate::security::{hash_password, verify_password};
use crate::services::user_service::{create_account, issue_code};
use crate::AppState;

fn expiry_of(claims: &RefreshClaims) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AppError::Internal("refresh token expiry out of range".to_string()))
}

fn issue_pair(user_id: Uuid, device_id: Uuid, token_id: Uuid) -> Result<(TokenPair, RefreshClaims)> {
    let access_token = jwt::generate_access_token(user_id)?;
    let refresh = jwt::generate_refresh_token(user_id, device_id, token_id)?;
    let pair = TokenPair {
        access_token,
        refresh_token: refresh.token,
        refresh_expires_in: refresh.claims.exp - refresh.claims.iat,
    };
    Ok((pair, refresh.claims))
}

/// Self-registration: the account stays unconfirmed until the emailed code
/// comes back.
pub async fn register(state: &AppState, input: &UserInput) -> Result<()> {
    let code = issue_code(state.config.codes.confirmation_ttl_secs);
    let user = create_account(&state.db, input, Some(&code)).await?;

    if let Err(e) = state.email.send_confirmation_email(&user.email, &code.code).await {
        warn!(user_id = %user.id, error = %e, "failed to send confirmation email");
    }
    Ok(())
}

pub async fn confirm_registration(pool: &PgPool, code: &str) -> Result<()> {
    let invalid = || AppError::field("code", "confirmation code is invalid or expired");

    let user = user_repo::find_by_confirmation_code(pool, &crypto_core::hash::sha256_hex(code))
        .await?
        .ok_or_else(invalid)?;

    let expired = user
        .confirmation_expires_at
        .map_or(true, |expires_at| expires_at <= Utc::now());
    if user.is_confirmed || expired {
        return Err(invalid());
    }

    user_repo::confirm_user(pool, user.id).await?;
    info!(user_id = %user.id, "registration confirmed");
    Ok(())
}

/// A fresh code replaces the previous one
pub async fn resend_confirmation(state: &AppState, email: &str) -> Result<()> {
    let user = user_repo::find_by_email(&state.db, email)
        .await?
        .filter(|user| !user.is_confirmed)
        .ok_or_else(|| AppError::field("email", "email is unknown or already confirmed"))?;

    let code = issue_code(state.config.codes.confirmation_ttl_secs);
    user_repo::set_confirmation_code(&state.db, user.id, &code.hash, code.expires_at).await?;

    if let Err(e) = state.email.send_confirmation_email(&user.email, &code.code).await {
        warn!(user_id = %user.id, error = %e, "failed to resend confirmation email");
    }
    Ok(())
}

pub async fn login(pool: &PgPool, input: &LoginInput, client: ClientInfo) -> Result<TokenPair> {
    let user = user_repo::find_by_login_or_email(pool, &input.login_or_email)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    if !verify_password(&input.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login rejected: wrong password");
        return Err(AppError::unauthorized());
    }
    if !user.is_confirmed {
        warn!(user_id = %user.id, "login rejected: account not confirmed");
        return Err(AppError::Authentication("Account is not confirmed".to_string()));
    }

    let device_id = Uuid::new_v4();
    let token_id = Uuid::new_v4();
    let (pair, claims) = issue_pair(user.id, device_id, token_id)?;

    device_repo::create_session(
        pool,
        &DeviceSession {
            device_id,
            user_id: user.id,
            ip: client.ip,
            title: client.title,
            last_active_date: Utc::now(),
            expires_at: expiry_of(&claims)?,
            token_id,
        },
    )
    .await?;

    info!(user_id = %user.id, %device_id, "user logged in");
    Ok(pair)
}

/// Resolve a refresh token to its live device session, or 401
pub async fn authenticate_refresh(
    pool: &PgPool,
    refresh_token: Option<&str>,
) -> Result<(RefreshClaims, DeviceSession)> {
    let token = refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(AppError::unauthorized)?;

    let claims = jwt::validate_refresh_token(token)
        .map_err(|_| AppError::unauthorized())?
        .claims;
    let user_id = claims.user_id().map_err(|_| AppError::unauthorized())?;
    let device_id = claims.device_id().map_err(|_| AppError::unauthorized())?;
    let token_id = claims.token_id().map_err(|_| AppError::unauthorized())?;

    let session = device_repo::find_session(pool, device_id)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    if session.user_id != user_id || session.token_id != token_id || session.expires_at <= Utc::now()
    {
        warn!(%device_id, "refresh token does not match its session");
        return Err(AppError::unauthorized());
    }

    Ok((claims, session))
}

/// Exchange a refresh token for a new pair; the presented token is spent
pub async fn refresh(pool: &PgPool, refresh_token: Option<&str>, ip: &str) -> Result<TokenPair> {
    let (_, session) = authenticate_refresh(pool, refresh_token).await?;

    let next_token_id = Uuid::new_v4();
    let (pair, claims) = issue_pair(session.user_id, session.device_id, next_token_id)?;

    let rotated = device_repo::rotate_session(
        pool,
        session.device_id,
        session.token_id,
        next_token_id,
        ip,
        Utc::now(),
        expiry_of(&claims)?,
    )
    .await?;

    if !rotated {
        warn!(device_id = %session.device_id, "refresh token already rotated");
        return Err(AppError::unauthorized());
    }
    Ok(pair)
}

pub async fn logout(pool: &PgPool, refresh_token: Option<&str>) -> Result<()> {
    let (_, session) = authenticate_refresh(pool, refresh_token).await?;
    device_repo::delete_session(pool, session.device_id).await?;
    info!(user_id = %session.user_id, device_id = %session.device_id, "user logged out");
    Ok(())
}

/// Succeeds whether or not the address is registered
pub async fn password_recovery(state: &AppState, email: &str) -> Result<()> {
    let Some(user) = user_repo::find_by_email(&state.db, email).await? else {
        info!("password recovery requested for unknown email");
        return Ok(());
    };

    let code = issue_code(state.config.codes.recovery_ttl_secs);
    user_repo::set_recovery_code(&state.db, user.id, &code.hash, code.expires_at).await?;

    if let Err(e) = state
        .email
        .send_password_recovery_email(&user.email, &code.code)
        .await
    {
        warn!(user_id = %user.id, error = %e, "failed to send password recovery email");
    }
    Ok(())
}

/// Set a new password from a recovery code and sign out every device
pub async fn new_password(pool: &PgPool, input: &NewPasswordInput) -> Result<()> {
    let invalid = || AppError::field("recoveryCode", "recovery code is invalid or expired");

    let user = user_repo::find_by_recovery_code(
        pool,
        &crypto_core::hash::sha256_hex(&input.recovery_code),
    )
    .await?
    .ok_or_else(invalid)?;

    if user
        .recovery_expires_at
        .map_or(true, |expires_at| expires_at <= Utc::now())
    {
        return Err(invalid());
    }

    let password_hash = hash_password(&input.new_password)?;
    user_repo::reset_password(pool, user.id, &password_hash).await?;
    info!(user_id = %user.id, "password reset; all sessions revoked");
    Ok(())
}

pub async fn me(pool: &PgPool, user_id: Uuid) -> Result<MeView> {
    user_repo::find_by_id(pool, user_id)
        .await?
        .map(MeView::from)
        .ok_or_else(AppError::unauthorized)
}
