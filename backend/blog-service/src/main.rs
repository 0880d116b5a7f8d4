use actix_cors::Cors;
use actix_middleware::{BasicAuthCredentials, MetricsMiddleware, RateLimitConfig, RateLimitMiddleware};
use actix_web::{web, App, HttpServer};
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blog_service::{
    background::{shutdown_background_tasks, spawn_background_tasks},
    config::Config,
    db::{create_pool, run_migrations},
    routes::configure_routes,
    AppState,
};
use crypto_core::jwt::{self, JwtSettings};

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    tracing::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing();

    let config = Config::from_env().map_err(|e| startup_error("Failed to load configuration", e))?;

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // ========================================
    // Initialize JWT keys
    // ========================================
    jwt::initialize_jwt_keys(JwtSettings {
        access_secret: config.jwt.access_secret.clone(),
        refresh_secret: config.jwt.refresh_secret.clone(),
        access_ttl_secs: config.jwt.access_token_ttl,
        refresh_ttl_secs: config.jwt.refresh_token_ttl,
    })
    .map_err(|e| startup_error("Failed to initialize JWT keys", e))?;
    tracing::info!("JWT keys initialized");

    // Create database connection pool
    let db_pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .map_err(|e| startup_error("Failed to create database pool", e))?;
    tracing::info!(
        "Database pool created with {} max connections",
        config.database.max_connections
    );

    run_migrations(&db_pool)
        .await
        .map_err(|e| startup_error("Database migrations failed", e))?;
    tracing::info!("Database migrations completed");

    // One limiter for all workers, so the budget is per process
    let rate_limit = RateLimitMiddleware::new(RateLimitConfig {
        max_requests: config.rate_limit.max_requests,
        window_seconds: config.rate_limit.window_secs,
        trust_forwarded_for: config.rate_limit.trust_forwarded_for,
    });
    tracing::info!(
        "Auth rate limiter initialized: {} requests per {}s",
        config.rate_limit.max_requests,
        config.rate_limit.window_secs
    );

    let admin = web::Data::new(BasicAuthCredentials::new(
        config.admin.username.clone(),
        config.admin.password.clone(),
    ));
    let enable_testing = !config.is_production();
    if enable_testing {
        tracing::warn!("Testing endpoint DELETE /testing/all-data is enabled");
    }

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let cors_origins = config.cors_origins();

    let state = AppState::new(db_pool.clone(), config)
        .map_err(|e| startup_error("Failed to initialize application state", e))?;
    if !state.email.is_enabled() {
        tracing::warn!("SMTP not configured; emails are logged instead of sent");
    }
    let state = web::Data::new(state);

    let background = spawn_background_tasks(db_pool, rate_limit.clone());

    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &cors_origins {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        let rate_limit = rate_limit.clone();

        App::new()
            .app_data(state.clone())
            .app_data(admin.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(MetricsMiddleware)
            .configure(|cfg| configure_routes(cfg, rate_limit, enable_testing))
    })
    .bind(&bind_address)?
    .shutdown_timeout(30)
    .run();

    // Runs until Ctrl+C or SIGTERM
    let result = server.await;

    tracing::info!("Server shutting down. Stopping background services...");
    shutdown_background_tasks(background).await;
    tracing::info!("Server shutdown complete.");

    result
}
