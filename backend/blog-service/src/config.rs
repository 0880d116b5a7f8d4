use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub codes: CodesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_env")]
    pub env: String,

    #[serde(default = "default_app_host")]
    pub host: String,

    #[serde(default = "default_app_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    #[serde(default = "default_jwt_access_secret")]
    pub access_secret: String,

    #[serde(default = "default_jwt_refresh_secret")]
    pub refresh_secret: String,

    #[serde(default = "default_jwt_access_ttl")]
    pub access_token_ttl: i64,

    #[serde(default = "default_jwt_refresh_ttl")]
    pub refresh_token_ttl: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Empty host switches the mailer to log-only mode
    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    #[serde(default = "default_smtp_from")]
    pub smtp_from: String,

    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_username")]
    pub username: String,

    #[serde(default = "default_admin_password")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_rate_limit_window_secs")]
    pub window_secs: u64,

    /// Key clients on `X-Forwarded-For`; only safe behind a proxy that sets it
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_allowed_origins")]
    pub allowed_origins: String,
}

/// Lifetimes of emailed one-time codes
#[derive(Debug, Clone, Deserialize)]
pub struct CodesConfig {
    #[serde(default = "default_code_ttl_secs")]
    pub confirmation_ttl_secs: i64,

    #[serde(default = "default_code_ttl_secs")]
    pub recovery_ttl_secs: i64,
}

// Default value functions
fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8080
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_jwt_access_secret() -> String {
    "dev-access-secret-change-me".to_string()
}

fn default_jwt_refresh_secret() -> String {
    "dev-refresh-secret-change-me".to_string()
}

fn default_jwt_access_ttl() -> i64 {
    900 // 15 minutes
}

fn default_jwt_refresh_ttl() -> i64 {
    604800 // 7 days
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "noreply@blogger.local".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "qwerty".to_string()
}

fn default_rate_limit_max_requests() -> u32 {
    5
}

fn default_rate_limit_window_secs() -> u64 {
    10
}

fn default_cors_allowed_origins() -> String {
    "http://localhost:3000".to_string()
}

fn default_code_ttl_secs() -> i64 {
    3600
}

fn var_or(key: &str, default: impl FnOnce() -> String) -> String {
    env::var(key).unwrap_or_else(|_| default())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let app = AppConfig {
            env: var_or("APP_ENV", default_app_env),
            host: var_or("APP_HOST", default_app_host),
            port: parse_or("APP_PORT", default_app_port()),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", default_db_max_connections()),
        };

        let jwt = JwtConfig {
            access_secret: var_or("JWT_ACCESS_SECRET", default_jwt_access_secret),
            refresh_secret: var_or("JWT_REFRESH_SECRET", default_jwt_refresh_secret),
            access_token_ttl: parse_or("JWT_ACCESS_TOKEN_TTL", default_jwt_access_ttl()),
            refresh_token_ttl: parse_or("JWT_REFRESH_TOKEN_TTL", default_jwt_refresh_ttl()),
        };

        let email = EmailConfig {
            smtp_host: env::var("SMTP_HOST").unwrap_or_default(),
            smtp_port: parse_or("SMTP_PORT", default_smtp_port()),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            smtp_from: var_or("SMTP_FROM", default_smtp_from),
            frontend_url: var_or("FRONTEND_URL", default_frontend_url),
        };

        let admin = AdminConfig {
            username: var_or("ADMIN_USERNAME", default_admin_username),
            password: var_or("ADMIN_PASSWORD", default_admin_password),
        };

        let rate_limit = RateLimitConfig {
            max_requests: parse_or("RATE_LIMIT_MAX_REQUESTS", default_rate_limit_max_requests()),
            window_secs: parse_or("RATE_LIMIT_WINDOW_SECS", default_rate_limit_window_secs()),
            trust_forwarded_for: parse_or("TRUST_FORWARDED_FOR", false),
        };

        let cors = CorsConfig {
            allowed_origins: var_or("CORS_ALLOWED_ORIGINS", default_cors_allowed_origins),
        };

        let codes = CodesConfig {
            confirmation_ttl_secs: parse_or("CONFIRMATION_CODE_TTL_SECS", default_code_ttl_secs()),
            recovery_ttl_secs: parse_or("RECOVERY_CODE_TTL_SECS", default_code_ttl_secs()),
        };

        let config = Config {
            app,
            database,
            jwt,
            email,
            admin,
            rate_limit,
            cors,
            codes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration with every default applied, pointing at `database_url`.
    pub fn with_defaults(database_url: impl Into<String>) -> Self {
        Config {
            app: AppConfig {
                env: default_app_env(),
                host: default_app_host(),
                port: default_app_port(),
            },
            database: DatabaseConfig {
                url: database_url.into(),
                max_connections: default_db_max_connections(),
            },
            jwt: JwtConfig {
                access_secret: default_jwt_access_secret(),
                refresh_secret: default_jwt_refresh_secret(),
                access_token_ttl: default_jwt_access_ttl(),
                refresh_token_ttl: default_jwt_refresh_ttl(),
            },
            email: EmailConfig {
                smtp_host: String::new(),
                smtp_port: default_smtp_port(),
                smtp_username: String::new(),
                smtp_password: String::new(),
                smtp_from: default_smtp_from(),
                frontend_url: default_frontend_url(),
            },
            admin: AdminConfig {
                username: default_admin_username(),
                password: default_admin_password(),
            },
            rate_limit: RateLimitConfig {
                max_requests: default_rate_limit_max_requests(),
                window_secs: default_rate_limit_window_secs(),
                trust_forwarded_for: false,
            },
            cors: CorsConfig {
                allowed_origins: default_cors_allowed_origins(),
            },
            codes: CodesConfig {
                confirmation_ttl_secs: default_code_ttl_secs(),
                recovery_ttl_secs: default_code_ttl_secs(),
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }

    /// Production must not run with development secrets.
    pub fn validate(&self) -> Result<(), String> {
        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ".to_string());
        }
        if !self.is_production() {
            return Ok(());
        }
        if self.jwt.access_secret == default_jwt_access_secret()
            || self.jwt.refresh_secret == default_jwt_refresh_secret()
        {
            return Err("JWT secrets must be set explicitly in production".to_string());
        }
        if self.admin.password == default_admin_password() {
            return Err("ADMIN_PASSWORD must be set explicitly in production".to_string());
        }
        Ok(())
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors
            .allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
