/// Post reads and writes, with per-viewer like info
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{blog_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{post::PostFields, LikeSubject, PageParams, Paginator, Post, PostView};
use crate::services::like_service;

async fn to_views(pool: &PgPool, posts: Vec<Post>, viewer: Option<Uuid>) -> Result<Vec<PostView>> {
    let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let statuses = like_service::my_statuses(pool, LikeSubject::Post, &ids, viewer).await?;
    let mut newest = like_service::newest_likes(pool, &ids).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let my_status = statuses.get(&post.id).copied().unwrap_or_default();
            let likes = newest.remove(&post.id).unwrap_or_default();
            PostView::new(post, my_status, likes)
        })
        .collect())
}

pub async fn get_post(pool: &PgPool, id: Uuid, viewer: Option<Uuid>) -> Result<PostView> {
    let post = post_repo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    to_views(pool, vec![post], viewer)
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("post view lost".to_string()))
}

/// All posts, or the posts of `blog_id` (404 when that blog is absent)
pub async fn list_posts(
    pool: &PgPool,
    blog_id: Option<Uuid>,
    page: &PageParams,
    viewer: Option<Uuid>,
) -> Result<Paginator<PostView>> {
    if let Some(blog_id) = blog_id {
        if !blog_repo::exists(pool, blog_id).await? {
            return Err(AppError::NotFound("Blog not found".to_string()));
        }
    }

    let (posts, total) = post_repo::list_posts(pool, blog_id, page).await?;
    let items = to_views(pool, posts, viewer).await?;
    Ok(Paginator::new(items, total, page))
}

/// A new post starts with no reactions
pub async fn create_post(pool: &PgPool, fields: &PostFields) -> Result<PostView> {
    let post = post_repo::create_post(pool, fields).await?;
    tracing::info!(post_id = %post.id, blog_id = %post.blog_id, "post created");
    Ok(PostView::new(post, Default::default(), Vec::new()))
}

pub async fn update_post(pool: &PgPool, id: Uuid, fields: &PostFields) -> Result<()> {
    if !post_repo::update_post(pool, id, fields).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    Ok(())
}

pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<()> {
    if !post_repo::delete_post(pool, id).await? {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    Ok(())
}

/// Resolve the `blogId` of a post body; unknown blogs are a field error
pub async fn resolve_blog_id(pool: &PgPool, raw: &str) -> Result<Uuid> {
    let invalid = || AppError::field("blogId", "blog does not exist");
    let blog_id = crate::validators::parse_id(raw).ok_or_else(invalid)?;
    if !blog_repo::exists(pool, blog_id).await? {
        return Err(invalid());
    }
    Ok(blog_id)
}
