/// Device session repository
///
/// Each row binds a device to the single refresh token (`token_id`) that
/// may currently be exchanged for it.
use crate::models::DeviceSession;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SESSION_COLUMNS: &str =
    "device_id, user_id, ip, title, last_active_date, expires_at, token_id";

pub async fn create_session(pool: &PgPool, session: &DeviceSession) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO device_sessions (device_id, user_id, ip, title, last_active_date, expires_at, token_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(session.device_id)
    .bind(session.user_id)
    .bind(&session.ip)
    .bind(&session.title)
    .bind(session.last_active_date)
    .bind(session.expires_at)
    .bind(session.token_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_session(pool: &PgPool, device_id: Uuid) -> Result<Option<DeviceSession>, sqlx::Error> {
    sqlx::query_as::<_, DeviceSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM device_sessions WHERE device_id = $1"
    ))
    .bind(device_id)
    .fetch_optional(pool)
    .await
}

/// Swap the accepted token id. Matching on the previous id makes a replayed
/// (already rotated) token lose the race; returns false in that case.
pub async fn rotate_session(
    pool: &PgPool,
    device_id: Uuid,
    previous_token_id: Uuid,
    next_token_id: Uuid,
    ip: &str,
    last_active_date: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE device_sessions
        SET token_id = $3, ip = $4, last_active_date = $5, expires_at = $6
        WHERE device_id = $1 AND token_id = $2
        "#,
    )
    .bind(device_id)
    .bind(previous_token_id)
    .bind(next_token_id)
    .bind(ip)
    .bind(last_active_date)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Live sessions of a user, most recently active first
pub async fn list_active_sessions(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<DeviceSession>, sqlx::Error> {
    sqlx::query_as::<_, DeviceSession>(&format!(
        r#"
        SELECT {SESSION_COLUMNS}
        FROM device_sessions
        WHERE user_id = $1 AND expires_at > NOW()
        ORDER BY last_active_date DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn delete_session(pool: &PgPool, device_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM device_sessions WHERE device_id = $1")
        .bind(device_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// End every session of `user_id` except `keep_device_id`
pub async fn delete_other_sessions(
    pool: &PgPool,
    user_id: Uuid,
    keep_device_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM device_sessions WHERE user_id = $1 AND device_id <> $2")
        .bind(user_id)
        .bind(keep_device_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Drop sessions whose refresh token can no longer be used
pub async fn delete_expired_sessions(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM device_sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
