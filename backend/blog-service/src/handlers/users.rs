use actix_middleware::AdminAuth;
use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::Result;
use crate::handlers::path_id;
use crate::models::{ListQuery, UserInput};
use crate::services::user_service;
use crate::AppState;

/// GET /users
pub async fn list_users(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let page = query.page();
    let login = ListQuery::term(&query.search_login_term);
    let email = ListQuery::term(&query.search_email_term);

    let users =
        user_service::list_users(&state.db, login.as_deref(), email.as_deref(), &page).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /users
pub async fn create_user(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    body: web::Json<UserInput>,
) -> Result<HttpResponse> {
    body.validate()?;
    let user = user_service::create_user(&state.db, &body).await?;
    Ok(HttpResponse::Created().json(user))
}

/// DELETE /users/{id}
pub async fn delete_user(
    _admin: AdminAuth,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let id = path_id(&path, "User")?;
    user_service::delete_user(&state.db, id).await?;
    Ok(HttpResponse::NoContent().finish())
}
