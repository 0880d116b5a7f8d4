use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod blog_repo;
pub mod comment_repo;
pub mod device_repo;
pub mod like_repo;
pub mod post_repo;
pub mod user_repo;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../migrations")
        .run(pool)
        .await
}

/// Liveness probe for the database
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Remove every row from every table (testing endpoint)
pub async fn clear_all_data(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE post_likes, comment_likes, comments, posts, blogs,
                       device_sessions, users
        RESTART IDENTITY CASCADE
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
