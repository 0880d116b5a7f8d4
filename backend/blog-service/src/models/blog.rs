use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validators::{trimmed, WEBSITE_URL_PATTERN};

#[derive(Debug, Clone, FromRow)]
pub struct Blog {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub website_url: String,
    pub is_membership: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub website_url: String,
    pub created_at: DateTime<Utc>,
    pub is_membership: bool,
}

impl From<Blog> for BlogView {
    fn from(blog: Blog) -> Self {
        Self {
            id: blog.id,
            name: blog.name,
            description: blog.description,
            website_url: blog.website_url,
            created_at: blog.created_at,
            is_membership: blog.is_membership,
        }
    }
}

/// Body of `POST /blogs` and `PUT /blogs/{id}`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 15, message = "name must be 1-15 characters"))]
    pub name: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(
        length(min = 1, max = 100, message = "websiteUrl must be 1-100 characters"),
        regex(path = *WEBSITE_URL_PATTERN, message = "websiteUrl must be an https URL")
    )]
    pub website_url: String,
}

/// Sortable view fields and their columns
pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("description", "description"),
    ("websiteUrl", "website_url"),
    ("createdAt", "created_at"),
    ("isMembership", "is_membership"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn input(json: &str) -> BlogInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_blog() {
        let blog = input(
            r#"{"name":" Rustaceans ","description":"All things Rust","websiteUrl":"https://rust-lang.org"}"#,
        );
        assert!(blog.validate().is_ok());
        assert_eq!(blog.name, "Rustaceans");
    }

    #[test]
    fn test_invalid_fields_report_wire_names() {
        let blog = input(r#"{"name":"   ","description":"d","websiteUrl":"ftp://x.org"}"#);
        let err: AppError = blog.validate().unwrap_err().into();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["name", "websiteUrl"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_name_too_long() {
        let blog = input(
            r#"{"name":"sixteen chars!!!","description":"d","websiteUrl":"https://a.io"}"#,
        );
        let errors = blog.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
