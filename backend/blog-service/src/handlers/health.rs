use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: &'static str,
}

/// Basic health check: answers 503 while PostgreSQL is unreachable
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    match crate::db::ping(&state.db).await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            database: "healthy",
        }),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unreachable");
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unavailable",
                version: env!("CARGO_PKG_VERSION"),
                database: "unhealthy",
            })
        }
    }
}
