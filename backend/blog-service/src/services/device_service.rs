/// Device sessions seen through the caller's refresh token
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::device_repo;
use crate::error::{AppError, Result};
use crate::models::DeviceView;
use crate::services::auth_service::authenticate_refresh;

pub async fn list_devices(pool: &PgPool, refresh_token: Option<&str>) -> Result<Vec<DeviceView>> {
    let (_, session) = authenticate_refresh(pool, refresh_token).await?;
    let sessions = device_repo::list_active_sessions(pool, session.user_id).await?;
    Ok(sessions.into_iter().map(DeviceView::from).collect())
}

/// Sign out everywhere except the current device
pub async fn terminate_other_devices(pool: &PgPool, refresh_token: Option<&str>) -> Result<()> {
    let (_, session) = authenticate_refresh(pool, refresh_token).await?;
    let removed =
        device_repo::delete_other_sessions(pool, session.user_id, session.device_id).await?;
    tracing::info!(user_id = %session.user_id, removed, "other device sessions terminated");
    Ok(())
}

pub async fn terminate_device(
    pool: &PgPool,
    refresh_token: Option<&str>,
    device_id: Uuid,
) -> Result<()> {
    let (_, current) = authenticate_refresh(pool, refresh_token).await?;

    let target = device_repo::find_session(pool, device_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Device not found".to_string()))?;

    if target.user_id != current.user_id {
        return Err(AppError::Authorization(
            "Device belongs to another user".to_string(),
        ));
    }

    device_repo::delete_session(pool, device_id).await?;
    Ok(())
}
