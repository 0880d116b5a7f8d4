use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One signed-in device: the refresh-token session bound to it
#[derive(Debug, Clone, FromRow)]
pub struct DeviceSession {
    pub device_id: Uuid,
    pub user_id: Uuid,
    pub ip: String,
    pub title: String,
    pub last_active_date: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// `jti` of the only refresh token currently accepted for this device
    pub token_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceView {
    pub ip: String,
    pub title: String,
    pub last_active_date: DateTime<Utc>,
    pub device_id: Uuid,
}

impl From<DeviceSession> for DeviceView {
    fn from(session: DeviceSession) -> Self {
        Self {
            ip: session.ip,
            title: session.title,
            last_active_date: session.last_active_date,
            device_id: session.device_id,
        }
    }
}
