use actix_web::{web, HttpResponse};

use crate::db;
use crate::error::Result;
use crate::AppState;

/// DELETE /testing/all-data
pub async fn clear_all_data(state: web::Data<AppState>) -> Result<HttpResponse> {
    db::clear_all_data(&state.db).await?;
    tracing::warn!("all data removed through the testing endpoint");
    Ok(HttpResponse::NoContent().finish())
}
