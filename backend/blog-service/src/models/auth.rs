//! Request and response bodies of the `/auth` endpoints

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validators::{string_or_empty, trimmed};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "loginOrEmail is required"))]
    pub login_or_email: String,

    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmationInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
}

/// Body of registration-email-resending and password-recovery
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmailInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordInput {
    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 6, max = 20, message = "newPassword must be 6-20 characters"))]
    pub new_password: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "recoveryCode is required"))]
    pub recovery_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenView {
    pub access_token: String,
}

/// Tokens issued by login and refresh
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_in: i64,
}

/// Client details recorded on the device session
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub title: String,
}
