pub mod background;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};

use services::EmailService;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared state handed to every handler through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub email: EmailService,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Result<Self> {
        let email = EmailService::new(&config.email)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            email,
        })
    }
}
