//! Background task management
//!
//! Long-running housekeeping tasks spawned next to the HTTP server.

use actix_middleware::RateLimitMiddleware;
use sqlx::PgPool;
use std::time::Duration;
use tokio::task::JoinHandle;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);
const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Background task handles for graceful shutdown
pub struct BackgroundTasks {
    pub session_cleanup_handle: JoinHandle<()>,
    pub rate_limit_prune_handle: JoinHandle<()>,
}

/// Spawn all background tasks
pub fn spawn_background_tasks(pool: PgPool, rate_limit: RateLimitMiddleware) -> BackgroundTasks {
    tracing::info!("Spawning background tasks...");

    BackgroundTasks {
        session_cleanup_handle: spawn_session_cleanup(pool, SESSION_CLEANUP_INTERVAL),
        rate_limit_prune_handle: spawn_rate_limit_prune(rate_limit, RATE_LIMIT_PRUNE_INTERVAL),
    }
}

/// Periodically forget rate-limit buckets that have fully refilled
fn spawn_rate_limit_prune(rate_limit: RateLimitMiddleware, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            rate_limit.retain_recent();
            tracing::debug!(tracked = rate_limit.tracked_keys(), "rate limiter pruned");
        }
    })
}

/// Periodically drop device sessions whose refresh token has expired
fn spawn_session_cleanup(pool: PgPool, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match crate::db::device_repo::delete_expired_sessions(&pool).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "expired device sessions removed"),
                Err(e) => tracing::warn!(error = %e, "device session cleanup failed"),
            }
        }
    })
}

/// Gracefully shutdown all background tasks
pub async fn shutdown_background_tasks(tasks: BackgroundTasks) {
    tracing::info!("Shutting down background tasks...");

    for (name, handle) in [
        ("Session cleanup", tasks.session_cleanup_handle),
        ("Rate limit prune", tasks.rate_limit_prune_handle),
    ] {
        handle.abort();
        match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(Ok(())) => tracing::info!("{} shut down gracefully", name),
            Ok(Err(_)) => tracing::info!("{} aborted", name),
            Err(_) => tracing::warn!("{} did not shut down within timeout", name),
        }
    }
}
