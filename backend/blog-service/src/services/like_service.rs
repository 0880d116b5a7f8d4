/// Like/dislike reactions on posts and comments
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::db::{like_repo, user_repo};
use crate::error::{AppError, Result};
use crate::models::{LikeStatus, LikeSubject, NewestLike};

/// Number of likers listed on a post view
pub const NEWEST_LIKES_LIMIT: i64 = 3;

/// Record `next` as the user's reaction and shift the subject's counters.
///
/// Runs in one transaction holding the subject row lock, so concurrent
/// reactions to the same post or comment apply their deltas one at a time.
pub async fn set_like_status(
    pool: &PgPool,
    subject: LikeSubject,
    subject_id: Uuid,
    user_id: Uuid,
    next: LikeStatus,
) -> Result<()> {
    if user_repo::find_by_id(pool, user_id).await?.is_none() {
        return Err(AppError::unauthorized());
    }

    let mut tx = pool.begin().await?;

    if !like_repo::lock_subject(&mut *tx, subject, subject_id).await? {
        return Err(AppError::NotFound(format!("{:?} not found", subject)));
    }

    let prior = like_repo::find_status_for_update(&mut *tx, subject, subject_id, user_id).await?;
    if prior == next {
        tx.rollback().await?;
        return Ok(());
    }

    let delta = LikeStatus::transition(prior, next);
    like_repo::upsert_status(&mut *tx, subject, subject_id, user_id, next)
        .await
        .map_err(AppError::from_user_write)?;
    like_repo::apply_delta(&mut *tx, subject, subject_id, delta).await?;
    tx.commit().await?;

    debug!(
        subject = ?subject,
        %subject_id,
        %user_id,
        from = %prior,
        to = %next,
        "like status changed"
    );
    Ok(())
}

/// The caller's status for every id; anonymous callers see `None` everywhere
pub async fn my_statuses(
    pool: &PgPool,
    subject: LikeSubject,
    subject_ids: &[Uuid],
    viewer: Option<Uuid>,
) -> Result<HashMap<Uuid, LikeStatus>> {
    match viewer {
        Some(user_id) => {
            Ok(like_repo::statuses_for_user(pool, subject, subject_ids, user_id).await?)
        }
        None => Ok(HashMap::new()),
    }
}

pub async fn newest_likes(
    pool: &PgPool,
    post_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<NewestLike>>> {
    Ok(like_repo::newest_likes(pool, post_ids, NEWEST_LIKES_LIMIT).await?)
}
