/// Comment repository
use crate::models::{comment::SORT_COLUMNS, Comment, PageParams};
use sqlx::PgPool;
use uuid::Uuid;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.user_id, u.login AS user_login, c.content,
           c.created_at, c.likes_count, c.dislikes_count
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

pub async fn create_comment(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO comments (post_id, user_id, content)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(content)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_post(
    pool: &PgPool,
    post_id: Uuid,
    page: &PageParams,
) -> Result<(Vec<Comment>, i64), sqlx::Error> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(pool)
        .await?;

    let comments = sqlx::query_as::<_, Comment>(&format!(
        r#"
        {COMMENT_SELECT}
        WHERE c.post_id = $1
        ORDER BY {}, c.id
        LIMIT $2 OFFSET $3
        "#,
        page.order_by(SORT_COLUMNS, "c.created_at")
    ))
    .bind(post_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    Ok((comments, total))
}

pub async fn update_content(pool: &PgPool, id: Uuid, content: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE comments SET content = $2 WHERE id = $1")
        .bind(id)
        .bind(content)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_comment(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
