use actix_middleware::{OptionalUserId, UserId};
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::handlers::path_id;
use crate::models::{CommentInput, LikeInput, LikeSubject};
use crate::services::{comment_service, like_service};
use crate::AppState;

/// GET /comments/{id}
pub async fn get_comment(
    viewer: OptionalUserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path_id(&path, "Comment")?;
    let comment = comment_service::get_comment(&state.db, id, viewer.0).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PUT /comments/{id}
pub async fn update_comment(
    user: UserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CommentInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let id = path_id(&path, "Comment")?;
    comment_service::update_comment(&state.db, id, user.0, &body.content).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /comments/{id}
pub async fn delete_comment(
    user: UserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path_id(&path, "Comment")?;
    comment_service::delete_comment(&state.db, id, user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /comments/{id}/like-status
pub async fn set_comment_like_status(
    user: UserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<LikeInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let status = body
        .status()
        .ok_or_else(|| AppError::field("likeStatus", "likeStatus must be None, Like or Dislike"))?;
    let id = path_id(&path, "Comment")?;

    like_service::set_like_status(&state.db, LikeSubject::Comment, id, user.0, status).await?;
    Ok(HttpResponse::NoContent().finish())
}
