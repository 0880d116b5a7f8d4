use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::Result;
use crate::handlers::{path_id, refresh_token_of};
use crate::services::device_service;
use crate::AppState;

/// GET /security/devices
pub async fn list_devices(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    let token = refresh_token_of(&req);
    let devices = device_service::list_devices(&state.db, token.as_deref()).await?;
    Ok(HttpResponse::Ok().json(devices))
}

/// DELETE /security/devices
pub async fn delete_other_devices(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let token = refresh_token_of(&req);
    device_service::terminate_other_devices(&state.db, token.as_deref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /security/devices/{deviceId}
pub async fn delete_device(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let token = refresh_token_of(&req);
    // An unauthenticated caller gets 401 even for a malformed device id
    let device_id = match path_id(&path, "Device") {
        Ok(id) => id,
        Err(not_found) => {
            crate::services::auth_service::authenticate_refresh(&state.db, token.as_deref())
                .await?;
            return Err(not_found);
        }
    };

    device_service::terminate_device(&state.db, token.as_deref(), device_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
