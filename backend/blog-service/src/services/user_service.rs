/// Account creation shared by the admin endpoint and self-registration
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::{user::NewUser, PageParams, Paginator, User, UserInput, UserView};
use crate::security::hash_password;

/// Code handed to the user and the hash + expiry stored for it
pub struct IssuedCode {
    pub code: String,
    pub hash: String,
    pub expires_at: chrono::DateTime<Utc>,
}

pub fn issue_code(ttl_secs: i64) -> IssuedCode {
    let code = crypto_core::hash::generate_code();
    IssuedCode {
        hash: crypto_core::hash::sha256_hex(&code),
        code,
        expires_at: Utc::now() + Duration::seconds(ttl_secs),
    }
}

/// 400 with the offending field when login or email is taken
async fn ensure_unique(pool: &PgPool, input: &UserInput) -> Result<()> {
    if user_repo::find_by_login(pool, &input.login).await?.is_some() {
        return Err(AppError::field("login", "login is already taken"));
    }
    if user_repo::find_by_email(pool, &input.email).await?.is_some() {
        return Err(AppError::field("email", "email is already registered"));
    }
    Ok(())
}

/// Insert a user. Unconfirmed accounts carry a confirmation code hash.
pub async fn create_account(
    pool: &PgPool,
    input: &UserInput,
    confirmation: Option<&IssuedCode>,
) -> Result<User> {
    ensure_unique(pool, input).await?;

    let new_user = NewUser {
        login: input.login.clone(),
        email: input.email.clone(),
        password_hash: hash_password(&input.password)?,
        is_confirmed: confirmation.is_none(),
        confirmation_code_hash: confirmation.map(|c| c.hash.clone()),
        confirmation_expires_at: confirmation.map(|c| c.expires_at),
    };

    // A concurrent insert can still win the race between the check and here
    let user = user_repo::create_user(pool, &new_user)
        .await
        .map_err(|e| match user_repo::duplicate_field(&e) {
            Some(field) => AppError::field(field, format!("{} is already taken", field)),
            None => AppError::Database(e),
        })?;

    tracing::info!(user_id = %user.id, login = %user.login, confirmed = user.is_confirmed, "user created");
    Ok(user)
}

/// Admin-created users are confirmed immediately
pub async fn create_user(pool: &PgPool, input: &UserInput) -> Result<UserView> {
    Ok(create_account(pool, input, None).await?.into())
}

pub async fn list_users(
    pool: &PgPool,
    search_login: Option<&str>,
    search_email: Option<&str>,
    page: &PageParams,
) -> Result<Paginator<UserView>> {
    let (users, total) = user_repo::list_users(pool, search_login, search_email, page).await?;
    let items = users.into_iter().map(UserView::from).collect();
    Ok(Paginator::new(items, total, page))
}

pub async fn delete_user(pool: &PgPool, id: Uuid) -> Result<()> {
    if !user_repo::delete_user(pool, id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!(user_id = %id, "user deleted");
    Ok(())
}
