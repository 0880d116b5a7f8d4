use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::like::LikeStatus;
use crate::validators::trimmed;

pub const MIN_COMMENT_LENGTH: u64 = 20;
pub const MAX_COMMENT_LENGTH: u64 = 300;

/// Comment row joined with its author's login
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub user_login: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes_count: i64,
    pub dislikes_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentatorInfo {
    pub user_id: Uuid,
    pub user_login: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikesInfo {
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub my_status: LikeStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub commentator_info: CommentatorInfo,
    pub created_at: DateTime<Utc>,
    pub likes_info: LikesInfo,
}

impl CommentView {
    pub fn new(comment: Comment, my_status: LikeStatus) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            commentator_info: CommentatorInfo {
                user_id: comment.user_id,
                user_login: comment.user_login,
            },
            created_at: comment.created_at,
            likes_info: LikesInfo {
                likes_count: comment.likes_count,
                dislikes_count: comment.dislikes_count,
                my_status,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 20, max = 300, message = "content must be 20-300 characters"))]
    pub content: String,
}

pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("id", "c.id"),
    ("content", "c.content"),
    ("createdAt", "c.created_at"),
];
