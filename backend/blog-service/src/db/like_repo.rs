/// Like status repository
///
/// Table names come from `LikeSubject`, never from request input.
use crate::models::{LikeDelta, LikeStatus, LikeSubject, NewestLike};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

/// Lock the subject row for the rest of the transaction. Serializes status
/// changes per subject; returns false when the subject does not exist.
pub async fn lock_subject(
    conn: &mut PgConnection,
    subject: LikeSubject,
    subject_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, Uuid>(&format!(
        "SELECT id FROM {} WHERE id = $1 FOR UPDATE",
        subject.counter_table()
    ))
    .bind(subject_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(found.is_some())
}

/// Locks the caller's status row (if any) for the rest of the transaction
pub async fn find_status_for_update(
    conn: &mut PgConnection,
    subject: LikeSubject,
    subject_id: Uuid,
    user_id: Uuid,
) -> Result<LikeStatus, sqlx::Error> {
    let status = sqlx::query_scalar::<_, String>(&format!(
        "SELECT status FROM {} WHERE {} = $1 AND user_id = $2 FOR UPDATE",
        subject.status_table(),
        subject.subject_column()
    ))
    .bind(subject_id)
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(status
        .and_then(|s| s.parse().ok())
        .unwrap_or(LikeStatus::None))
}

/// Insert or replace the caller's status; `added_at` moves to now
pub async fn upsert_status(
    conn: &mut PgConnection,
    subject: LikeSubject,
    subject_id: Uuid,
    user_id: Uuid,
    status: LikeStatus,
) -> Result<(), sqlx::Error> {
    let column = subject.subject_column();
    sqlx::query(&format!(
        r#"
        INSERT INTO {table} ({column}, user_id, status, added_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT ({column}, user_id)
        DO UPDATE SET status = EXCLUDED.status, added_at = EXCLUDED.added_at
        "#,
        table = subject.status_table(),
    ))
    .bind(subject_id)
    .bind(user_id)
    .bind(status.as_str())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Add `delta` to the subject's counters in place
pub async fn apply_delta(
    conn: &mut PgConnection,
    subject: LikeSubject,
    subject_id: Uuid,
    delta: LikeDelta,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        r#"
        UPDATE {}
        SET likes_count = likes_count + $2, dislikes_count = dislikes_count + $3
        WHERE id = $1
        "#,
        subject.counter_table()
    ))
    .bind(subject_id)
    .bind(delta.likes)
    .bind(delta.dislikes)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// The user's status for each of `subject_ids`; absent ids mean `None`
pub async fn statuses_for_user(
    pool: &PgPool,
    subject: LikeSubject,
    subject_ids: &[Uuid],
    user_id: Uuid,
) -> Result<HashMap<Uuid, LikeStatus>, sqlx::Error> {
    if subject_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, String)>(&format!(
        "SELECT {column}, status FROM {table} WHERE {column} = ANY($1) AND user_id = $2",
        column = subject.subject_column(),
        table = subject.status_table(),
    ))
    .bind(subject_ids)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, status)| status.parse().ok().map(|s| (id, s)))
        .collect())
}

/// Up to `limit` most recent likes per post, newest first
pub async fn newest_likes(
    pool: &PgPool,
    post_ids: &[Uuid],
    limit: i64,
) -> Result<HashMap<Uuid, Vec<NewestLike>>, sqlx::Error> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, NewestLike>(
        r#"
        SELECT post_id, user_id, login, added_at
        FROM (
            SELECT pl.post_id, pl.user_id, u.login, pl.added_at,
                   ROW_NUMBER() OVER (PARTITION BY pl.post_id ORDER BY pl.added_at DESC) AS rn
            FROM post_likes pl
            JOIN users u ON u.id = pl.user_id
            WHERE pl.post_id = ANY($1) AND pl.status = 'Like'
        ) ranked
        WHERE rn <= $2
        ORDER BY post_id, added_at DESC
        "#,
    )
    .bind(post_ids)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut by_post: HashMap<Uuid, Vec<NewestLike>> = HashMap::new();
    for like in rows {
        by_post.entry(like.post_id).or_default().push(like);
    }
    Ok(by_post)
}
