/// Post repository - posts are always read joined with their blog's name
use crate::models::{post::PostFields, post::SORT_COLUMNS, PageParams, Post};
use sqlx::PgPool;
use uuid::Uuid;

const POST_SELECT: &str = r#"
    SELECT p.id, p.blog_id, b.name AS blog_name, p.title, p.short_description,
           p.content, p.created_at, p.likes_count, p.dislikes_count
    FROM posts p
    JOIN blogs b ON b.id = p.blog_id
"#;

pub async fn create_post(pool: &PgPool, fields: &PostFields) -> Result<Post, sqlx::Error> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO posts (blog_id, title, short_description, content)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(fields.blog_id)
    .bind(&fields.title)
    .bind(&fields.short_description)
    .bind(&fields.content)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Page of posts, optionally restricted to one blog
pub async fn list_posts(
    pool: &PgPool,
    blog_id: Option<Uuid>,
    page: &PageParams,
) -> Result<(Vec<Post>, i64), sqlx::Error> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts WHERE ($1::uuid IS NULL OR blog_id = $1)",
    )
    .bind(blog_id)
    .fetch_one(pool)
    .await?;

    let posts = sqlx::query_as::<_, Post>(&format!(
        r#"
        {POST_SELECT}
        WHERE ($1::uuid IS NULL OR p.blog_id = $1)
        ORDER BY {}, p.id
        LIMIT $2 OFFSET $3
        "#,
        page.order_by(SORT_COLUMNS, "p.created_at")
    ))
    .bind(blog_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((posts, total))
}

pub async fn update_post(pool: &PgPool, id: Uuid, fields: &PostFields) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET blog_id = $2, title = $3, short_description = $4, content = $5
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(fields.blog_id)
    .bind(&fields.title)
    .bind(&fields.short_description)
    .bind(&fields.content)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
