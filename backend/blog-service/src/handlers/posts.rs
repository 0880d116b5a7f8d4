use actix_middleware::{AdminAuth, OptionalUserId, UserId};
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::handlers::path_id;
use crate::models::{CommentInput, LikeInput, LikeSubject, ListQuery, PostInput};
use crate::services::{comment_service, like_service, post_service};
use crate::AppState;

/// GET /posts
pub async fn list_posts(
    viewer: OptionalUserId,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let page = query.page();
    let posts = post_service::list_posts(&state.db, None, &page, viewer.0).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /posts
pub async fn create_post(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<PostInput>,
) -> Result<HttpResponse> {
    let input = body.into_inner();
    input.validate()?;
    let blog_id = post_service::resolve_blog_id(&state.db, &input.blog_id).await?;

    let post = post_service::create_post(&state.db, &input.into_fields(blog_id)).await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /posts/{id}
pub async fn get_post(
    viewer: OptionalUserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path_id(&path, "Post")?;
    let post = post_service::get_post(&state.db, id, viewer.0).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /posts/{id}
pub async fn update_post(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PostInput>,
) -> Result<HttpResponse> {
    let input = body.into_inner();
    input.validate()?;
    let blog_id = post_service::resolve_blog_id(&state.db, &input.blog_id).await?;
    let id = path_id(&path, "Post")?;

    post_service::update_post(&state.db, id, &input.into_fields(blog_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /posts/{id}
pub async fn delete_post(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path_id(&path, "Post")?;
    post_service::delete_post(&state.db, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /posts/{postId}/comments
pub async fn list_post_comments(
    viewer: OptionalUserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let post_id = path_id(&path, "Post")?;
    let page = query.page();
    let comments = comment_service::list_for_post(&state.db, post_id, &page, viewer.0).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /posts/{postId}/comments
pub async fn create_post_comment(
    user: UserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CommentInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let post_id = path_id(&path, "Post")?;
    let comment = comment_service::create_comment(&state.db, post_id, user.0, &body.content).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// PUT /posts/{postId}/like-status
pub async fn set_post_like_status(
    user: UserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<LikeInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let status = body
        .status()
        .ok_or_else(|| AppError::field("likeStatus", "likeStatus must be None, Like or Dislike"))?;
    let post_id = path_id(&path, "Post")?;

    like_service::set_like_status(&state.db, LikeSubject::Post, post_id, user.0, status).await?;
    Ok(HttpResponse::NoContent().finish())
}
