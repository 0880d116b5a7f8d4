use actix_middleware::{AdminAuth, OptionalUserId};
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::db::blog_repo;
use crate::error::{AppError, Result};
use crate::handlers::path_id;
use crate::models::{BlogInput, BlogPostInput, BlogView, ListQuery, Paginator};
use crate::services::post_service;
use crate::AppState;

/// GET /blogs
pub async fn list_blogs(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let page = query.page();
    let term = ListQuery::term(&query.search_name_term);

    let (blogs, total) = blog_repo::list_blogs(&state.db, term.as_deref(), &page).await?;
    let items: Vec<BlogView> = blogs.into_iter().map(BlogView::from).collect();
    Ok(HttpResponse::Ok().json(Paginator::new(items, total, &page)))
}

/// POST /blogs
pub async fn create_blog(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<BlogInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let blog = blog_repo::create_blog(&state.db, &body).await?;
    tracing::info!(blog_id = %blog.id, "blog created");
    Ok(HttpResponse::Created().json(BlogView::from(blog)))
}

/// GET /blogs/{id}
pub async fn get_blog(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let id = path_id(&path, "Blog")?;
    let blog = blog_repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog not found".to_string()))?;
    Ok(HttpResponse::Ok().json(BlogView::from(blog)))
}

/// PUT /blogs/{id}
pub async fn update_blog(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<BlogInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let id = path_id(&path, "Blog")?;
    if !blog_repo::update_blog(&state.db, id, &body).await? {
        return Err(AppError::NotFound("Blog not found".to_string()));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /blogs/{id}
pub async fn delete_blog(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path_id(&path, "Blog")?;
    if !blog_repo::delete_blog(&state.db, id).await? {
        return Err(AppError::NotFound("Blog not found".to_string()));
    }
    tracing::info!(blog_id = %id, "blog deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /blogs/{blogId}/posts
pub async fn list_blog_posts(
    viewer: OptionalUserId,
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let blog_id = path_id(&path, "Blog")?;
    let page = query.page();
    let posts = post_service::list_posts(&state.db, Some(blog_id), &page, viewer.0).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /blogs/{blogId}/posts
pub async fn create_blog_post(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<BlogPostInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let blog_id = path_id(&path, "Blog")?;
    if !blog_repo::exists(&state.db, blog_id).await? {
        return Err(AppError::NotFound("Blog not found".to_string()));
    }

    let post = post_service::create_post(&state.db, &body.into_inner().into_fields(blog_id)).await?;
    Ok(HttpResponse::Created().json(post))
}
