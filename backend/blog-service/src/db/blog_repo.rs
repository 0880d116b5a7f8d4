/// Blog repository - handles all database operations for blogs
use crate::models::{blog::SORT_COLUMNS, Blog, BlogInput, PageParams};
use sqlx::PgPool;
use uuid::Uuid;

const BLOG_COLUMNS: &str = "id, name, description, website_url, is_membership, created_at";

pub async fn create_blog(pool: &PgPool, input: &BlogInput) -> Result<Blog, sqlx::Error> {
    sqlx::query_as::<_, Blog>(&format!(
        r#"
        INSERT INTO blogs (name, description, website_url)
        VALUES ($1, $2, $3)
        RETURNING {BLOG_COLUMNS}
        "#
    ))
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.website_url)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
    sqlx::query_as::<_, Blog>(&format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blogs WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Page of blogs whose name contains `search_name` (case-insensitive)
pub async fn list_blogs(
    pool: &PgPool,
    search_name: Option<&str>,
    page: &PageParams,
) -> Result<(Vec<Blog>, i64), sqlx::Error> {
    let pattern = search_name.map(|term| format!("%{}%", crate::validators::escape_like(term)));

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM blogs WHERE ($1::text IS NULL OR name ILIKE $1)",
    )
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await?;

    let blogs = sqlx::query_as::<_, Blog>(&format!(
        r#"
        SELECT {BLOG_COLUMNS}
        FROM blogs
        WHERE ($1::text IS NULL OR name ILIKE $1)
        ORDER BY {}, id
        LIMIT $2 OFFSET $3
        "#,
        page.order_by(SORT_COLUMNS, "created_at")
    ))
    .bind(pattern.as_deref())
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((blogs, total))
}

/// Returns false when no blog has this id
pub async fn update_blog(pool: &PgPool, id: Uuid, input: &BlogInput) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE blogs
        SET name = $2, description = $3, website_url = $4
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(&input.website_url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes the blog and, through the foreign keys, its posts
pub async fn delete_blog(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
