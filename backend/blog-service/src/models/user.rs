use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validators::{string_or_empty, trimmed, LOGIN_PATTERN};

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub is_confirmed: bool,
    pub confirmation_code_hash: Option<String>,
    pub confirmation_expires_at: Option<DateTime<Utc>>,
    pub recovery_code_hash: Option<String>,
    pub recovery_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub login: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// `GET /auth/me`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    pub email: String,
    pub login: String,
    pub user_id: Uuid,
}

impl From<User> for MeView {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            login: user.login,
            user_id: user.id,
        }
    }
}

/// Body of `POST /users` and `POST /auth/registration`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        length(min = 3, max = 10, message = "login must be 3-10 characters"),
        regex(path = *LOGIN_PATTERN, message = "login may contain only letters, digits, _ and -")
    )]
    pub login: String,

    #[serde(default, deserialize_with = "string_or_empty")]
    #[validate(length(min = 6, max = 20, message = "password must be 6-20 characters"))]
    pub password: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
}

/// Fields written when creating an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub email: String,
    pub password_hash: String,
    pub is_confirmed: bool,
    pub confirmation_code_hash: Option<String>,
    pub confirmation_expires_at: Option<DateTime<Utc>>,
}

pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "id"),
    ("login", "login"),
    ("email", "email"),
    ("createdAt", "created_at"),
];
