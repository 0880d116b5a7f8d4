/// User repository - handles all database operations for users
use crate::models::{user::NewUser, user::SORT_COLUMNS, PageParams, User};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = r#"id, login, email, password_hash, created_at, is_confirmed,
    confirmation_code_hash, confirmation_expires_at, recovery_code_hash, recovery_expires_at"#;

/// Create a new user; emails are stored lowercased
pub async fn create_user(pool: &PgPool, new_user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (login, email, password_hash, is_confirmed,
                           confirmation_code_hash, confirmation_expires_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&new_user.login)
    .bind(new_user.email.to_lowercase())
    .bind(&new_user.password_hash)
    .bind(new_user.is_confirmed)
    .bind(new_user.confirmation_code_hash.as_deref())
    .bind(new_user.confirmation_expires_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE login = $1"))
        .bind(login)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await
}

/// Sign-in lookup: matches either the login or the email
pub async fn find_by_login_or_email(
    pool: &PgPool,
    login_or_email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE login = $1 OR email = LOWER($1) LIMIT 1"
    ))
    .bind(login_or_email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_confirmation_code(
    pool: &PgPool,
    code_hash: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE confirmation_code_hash = $1"
    ))
    .bind(code_hash)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_recovery_code(
    pool: &PgPool,
    code_hash: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE recovery_code_hash = $1"
    ))
    .bind(code_hash)
    .fetch_optional(pool)
    .await
}

/// Mark the account confirmed and burn the confirmation code
pub async fn confirm_user(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET is_confirmed = TRUE, confirmation_code_hash = NULL, confirmation_expires_at = NULL
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_confirmation_code(
    pool: &PgPool,
    id: Uuid,
    code_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET confirmation_code_hash = $2, confirmation_expires_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(code_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn set_recovery_code(
    pool: &PgPool,
    id: Uuid,
    code_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET recovery_code_hash = $2, recovery_expires_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(code_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Store a new password hash, burn the recovery code and end every session
pub async fn reset_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2, recovery_code_hash = NULL, recovery_expires_at = NULL
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM device_sessions WHERE user_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Page of users matching either search term (case-insensitive)
pub async fn list_users(
    pool: &PgPool,
    search_login: Option<&str>,
    search_email: Option<&str>,
    page: &PageParams,
) -> Result<(Vec<User>, i64), sqlx::Error> {
    let login_pattern = search_login.map(|t| format!("%{}%", crate::validators::escape_like(t)));
    let email_pattern = search_email.map(|t| format!("%{}%", crate::validators::escape_like(t)));

    // No terms: everything. Otherwise: any supplied term matches.
    let filter = r#"
        ($1::text IS NULL AND $2::text IS NULL)
        OR ($1::text IS NOT NULL AND login ILIKE $1)
        OR ($2::text IS NOT NULL AND email ILIKE $2)
    "#;

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users WHERE {filter}"))
        .bind(login_pattern.as_deref())
        .bind(email_pattern.as_deref())
        .fetch_one(pool)
        .await?;

    let users = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE {filter}
        ORDER BY {}, id
        LIMIT $3 OFFSET $4
        "#,
        page.order_by(SORT_COLUMNS, "created_at")
    ))
    .bind(login_pattern.as_deref())
    .bind(email_pattern.as_deref())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((users, total))
}

/// Delete a user. Counters of everything they reacted to are rolled back
/// first; their comments, reactions and sessions go with the row.
pub async fn delete_user(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE posts p
        SET likes_count = p.likes_count - (pl.status = 'Like')::int,
            dislikes_count = p.dislikes_count - (pl.status = 'Dislike')::int
        FROM post_likes pl
        WHERE pl.post_id = p.id AND pl.user_id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE comments c
        SET likes_count = c.likes_count - (cl.status = 'Like')::int,
            dislikes_count = c.dislikes_count - (cl.status = 'Dislike')::int
        FROM comment_likes cl
        WHERE cl.comment_id = c.id AND cl.user_id = $1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

/// Whether a unique-constraint violation names the login or the email index
pub fn duplicate_field(err: &sqlx::Error) -> Option<&'static str> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }
    match db_err.constraint() {
        Some("users_login_key") => Some("login"),
        Some("users_email_key") => Some("email"),
        _ => None,
    }
}
