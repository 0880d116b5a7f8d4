/// Access and refresh token handling for the blogger platform
///
/// Tokens are HS256 JWTs. Access and refresh tokens are signed with two
/// distinct secrets, so a refresh token never validates as an access token
/// and vice versa. The `token_type` claim is checked on top of that.
///
/// ## Usage
///
/// Call `initialize_jwt_keys()` once during startup before any JWT operation:
///
/// ```rust,no_run
/// use crypto_core::jwt::{self, JwtSettings};
///
/// jwt::initialize_jwt_keys(JwtSettings {
///     access_secret: "access-secret".into(),
///     refresh_secret: "refresh-secret".into(),
///     access_ttl_secs: 900,
///     refresh_ttl_secs: 604_800,
/// })
/// .expect("Failed to initialize JWT keys");
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

// ============================================================================
// Data Structures
// ============================================================================

/// Secrets and lifetimes used to build the global key material.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

/// Claims carried by a refresh token
///
/// `device_id` names the device session the token belongs to and `jti`
/// must match the session's current token id for the token to be accepted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RefreshClaims {
    pub sub: String,
    pub device_id: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }
}

impl RefreshClaims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID format in token: {e}"))
    }

    pub fn device_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.device_id)
            .map_err(|e| anyhow!("Invalid device ID format in token: {e}"))
    }

    pub fn token_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.jti).map_err(|e| anyhow!("Invalid token ID format in token: {e}"))
    }
}

/// Freshly issued refresh token together with the claims it encodes.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub claims: RefreshClaims,
}

struct JwtKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

// ============================================================================
// Key Storage
// ============================================================================

static JWT_KEYS: OnceCell<JwtKeys> = OnceCell::new();

/// Initialize the global JWT keys
///
/// Can only be called once; subsequent calls return an error.
pub fn initialize_jwt_keys(settings: JwtSettings) -> Result<()> {
    if settings.access_secret.is_empty() || settings.refresh_secret.is_empty() {
        return Err(anyhow!("JWT secrets must not be empty"));
    }
    if settings.access_secret == settings.refresh_secret {
        return Err(anyhow!("Access and refresh secrets must differ"));
    }
    if settings.access_ttl_secs <= 0 || settings.refresh_ttl_secs <= 0 {
        return Err(anyhow!("JWT lifetimes must be positive"));
    }

    let keys = JwtKeys {
        access_encoding: EncodingKey::from_secret(settings.access_secret.as_bytes()),
        access_decoding: DecodingKey::from_secret(settings.access_secret.as_bytes()),
        refresh_encoding: EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
        refresh_decoding: DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
        access_ttl_secs: settings.access_ttl_secs,
        refresh_ttl_secs: settings.refresh_ttl_secs,
    };

    JWT_KEYS
        .set(keys)
        .map_err(|_| anyhow!("JWT keys already initialized"))
}

/// Whether `initialize_jwt_keys()` has already run in this process.
pub fn is_initialized() -> bool {
    JWT_KEYS.get().is_some()
}

fn keys() -> Result<&'static JwtKeys> {
    JWT_KEYS
        .get()
        .ok_or_else(|| anyhow!("JWT keys not initialized. Call initialize_jwt_keys() during startup."))
}

// ============================================================================
// Token Generation
// ============================================================================

/// Generate a short-lived access token for `user_id`.
pub fn generate_access_token(user_id: Uuid) -> Result<String> {
    let keys = keys()?;
    let now = Utc::now();

    let claims = AccessClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(keys.access_ttl_secs)).timestamp(),
        token_type: ACCESS_TOKEN_TYPE.to_string(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, &keys.access_encoding)
        .map_err(|e| anyhow!("Failed to generate access token: {e}"))
}

/// Generate a refresh token bound to a device session and token id.
pub fn generate_refresh_token(
    user_id: Uuid,
    device_id: Uuid,
    token_id: Uuid,
) -> Result<IssuedRefreshToken> {
    let keys = keys()?;
    let now = Utc::now();

    let claims = RefreshClaims {
        sub: user_id.to_string(),
        device_id: device_id.to_string(),
        jti: token_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(keys.refresh_ttl_secs)).timestamp(),
        token_type: REFRESH_TOKEN_TYPE.to_string(),
    };

    let token = encode(&Header::new(JWT_ALGORITHM), &claims, &keys.refresh_encoding)
        .map_err(|e| anyhow!("Failed to generate refresh token: {e}"))?;

    Ok(IssuedRefreshToken { token, claims })
}

// ============================================================================
// Token Validation
// ============================================================================

fn strict_validation() -> Validation {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation
}

/// Validate an access token (without the "Bearer " prefix).
pub fn validate_access_token(token: &str) -> Result<TokenData<AccessClaims>> {
    let keys = keys()?;
    let data = decode::<AccessClaims>(token, &keys.access_decoding, &strict_validation())
        .map_err(|e| anyhow!("Token validation failed: {e}"))?;

    if data.claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(anyhow!("Unexpected token type: {}", data.claims.token_type));
    }
    Ok(data)
}

/// Validate a refresh token's signature, expiry and type.
///
/// Session binding (`device_id`/`jti`) is checked by the caller against storage.
pub fn validate_refresh_token(token: &str) -> Result<TokenData<RefreshClaims>> {
    let keys = keys()?;
    let data = decode::<RefreshClaims>(token, &keys.refresh_decoding, &strict_validation())
        .map_err(|e| anyhow!("Token validation failed: {e}"))?;

    if data.claims.token_type != REFRESH_TOKEN_TYPE {
        return Err(anyhow!("Unexpected token type: {}", data.claims.token_type));
    }
    Ok(data)
}

/// Extract the user ID from a validated access token.
pub fn get_user_id_from_token(token: &str) -> Result<Uuid> {
    validate_access_token(token)?.claims.user_id()
}

// ============================================================================
// Tests
// ============================================================================
