/// Comments under posts
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{comment_repo, post_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{Comment, CommentView, LikeSubject, PageParams, Paginator};
use crate::services::like_service;

async fn to_views(
    pool: &PgPool,
    comments: Vec<Comment>,
    viewer: Option<Uuid>,
) -> Result<Vec<CommentView>> {
    let ids: Vec<Uuid> = comments.iter().map(|c| c.id).collect();
    let statuses = like_service::my_statuses(pool, LikeSubject::Comment, &ids, viewer).await?;

    Ok(comments
        .into_iter()
        .map(|comment| {
            let my_status = statuses.get(&comment.id).copied().unwrap_or_default();
            CommentView::new(comment, my_status)
        })
        .collect())
}

async fn find_comment(pool: &PgPool, id: Uuid) -> Result<Comment> {
    comment_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))
}

/// Loads the comment and checks that `user_id` wrote it
async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Comment> {
    let comment = find_comment(pool, id).await?;
    if comment.user_id != user_id {
        return Err(AppError::Authorization(
            "Comment belongs to another user".to_string(),
        ));
    }
    Ok(comment)
}

pub async fn get_comment(pool: &PgPool, id: Uuid, viewer: Option<Uuid>) -> Result<CommentView> {
    let comment = find_comment(pool, id).await?;
    to_views(pool, vec![comment], viewer)
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("comment view lost".to_string()))
}

pub async fn list_for_post(
    pool: &PgPool,
    post_id: Uuid,
    page: &PageParams,
    viewer: Option<Uuid>,
) -> Result<Paginator<CommentView>> {
    if !post_repo::exists(pool, post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let (comments, total) = comment_repo::list_by_post(pool, post_id, page).await?;
    let items = to_views(pool, comments, viewer).await?;
    Ok(Paginator::new(items, total, page))
}

pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<CommentView> {
    if !post_repo::exists(pool, post_id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    if user_repo::find_by_id(pool, user_id).await?.is_none() {
        return Err(AppError::unauthorized());
    }

    let comment = comment_repo::create_comment(pool, post_id, user_id, content)
        .await
        .map_err(AppError::from_user_write)?;
    tracing::info!(comment_id = %comment.id, %post_id, %user_id, "comment created");
    Ok(CommentView::new(comment, Default::default()))
}

pub async fn update_comment(pool: &PgPool, id: Uuid, user_id: Uuid, content: &str) -> Result<()> {
    find_owned(pool, id, user_id).await?;
    if !comment_repo::update_content(pool, id, content).await? {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }
    Ok(())
}

pub async fn delete_comment(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<()> {
    find_owned(pool, id, user_id).await?;
    if !comment_repo::delete_comment(pool, id).await? {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }
    Ok(())
}
