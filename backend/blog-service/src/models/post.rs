use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::like::{LikeStatus, NewestLike};
use crate::validators::trimmed;

/// Post row joined with its blog's name
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub blog_name: String,
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub dislikes_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedLikesInfo {
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub my_status: LikeStatus,
    pub newest_likes: Vec<NewestLike>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub blog_id: Uuid,
    pub blog_name: String,
    pub created_at: DateTime<Utc>,
    pub extended_likes_info: ExtendedLikesInfo,
}

impl PostView {
    pub fn new(post: Post, my_status: LikeStatus, newest_likes: Vec<NewestLike>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            short_description: post.short_description,
            content: post.content,
            blog_id: post.blog_id,
            blog_name: post.blog_name,
            created_at: post.created_at,
            extended_likes_info: ExtendedLikesInfo {
                likes_count: post.likes_count,
                dislikes_count: post.dislikes_count,
                my_status,
                newest_likes,
            },
        }
    }
}

/// Body of `POST /posts` and `PUT /posts/{id}`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30, message = "title must be 1-30 characters"))]
    pub title: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "shortDescription must be 1-100 characters"))]
    pub short_description: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 1000, message = "content must be 1-1000 characters"))]
    pub content: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "blogId is required"))]
    pub blog_id: String,
}

/// Body of `POST /blogs/{blogId}/posts`; the blog comes from the path
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 30, message = "title must be 1-30 characters"))]
    pub title: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "shortDescription must be 1-100 characters"))]
    pub short_description: String,

    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 1000, message = "content must be 1-1000 characters"))]
    pub content: String,
}

/// Fields written by create/update, with the blog already resolved
#[derive(Debug, Clone)]
pub struct PostFields {
    pub title: String,
    pub short_description: String,
    pub content: String,
    pub blog_id: Uuid,
}

impl BlogPostInput {
    pub fn into_fields(self, blog_id: Uuid) -> PostFields {
        PostFields {
            title: self.title,
            short_description: self.short_description,
            content: self.content,
            blog_id,
        }
    }
}

impl PostInput {
    pub fn into_fields(self, blog_id: Uuid) -> PostFields {
        PostFields {
            title: self.title,
            short_description: self.short_description,
            content: self.content,
            blog_id,
        }
    }
}

pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "p.id"),
    ("title", "p.title"),
    ("shortDescription", "p.short_description"),
    ("content", "p.content"),
    ("blogId", "p.blog_id"),
    ("blogName", "b.name"),
    ("createdAt", "p.created_at"),
];
