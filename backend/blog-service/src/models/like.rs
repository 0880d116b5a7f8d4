use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::validators::trimmed;

/// A user's reaction to a post or comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LikeStatus {
    #[default]
    None,
    Like,
    Dislike,
}

impl LikeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LikeStatus::None => "None",
            LikeStatus::Like => "Like",
            LikeStatus::Dislike => "Dislike",
        }
    }

    /// Counter adjustment for moving from `prior` to `next`.
    pub fn transition(prior: LikeStatus, next: LikeStatus) -> LikeDelta {
        use LikeStatus::*;

        match (prior, next) {
            (None, Like) => LikeDelta::new(1, 0),
            (None, Dislike) => LikeDelta::new(0, 1),
            (Like, None) => LikeDelta::new(-1, 0),
            (Like, Dislike) => LikeDelta::new(-1, 1),
            (Dislike, None) => LikeDelta::new(0, -1),
            (Dislike, Like) => LikeDelta::new(1, -1),
            (None, None) | (Like, Like) | (Dislike, Dislike) => LikeDelta::default(),
        }
    }
}

impl fmt::Display for LikeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LikeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(LikeStatus::None),
            "Like" => Ok(LikeStatus::Like),
            "Dislike" => Ok(LikeStatus::Dislike),
            other => Err(format!("unknown like status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LikeDelta {
    pub likes: i64,
    pub dislikes: i64,
}

impl LikeDelta {
    pub const fn new(likes: i64, dislikes: i64) -> Self {
        Self { likes, dislikes }
    }

    pub fn is_zero(&self) -> bool {
        self.likes == 0 && self.dislikes == 0
    }
}

/// Likeable entity kinds, each with its own status table and counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeSubject {
    Post,
    Comment,
}

impl LikeSubject {
    pub(crate) fn status_table(self) -> &'static str {
        match self {
            LikeSubject::Post => "post_likes",
            LikeSubject::Comment => "comment_likes",
        }
    }

    pub(crate) fn subject_column(self) -> &'static str {
        match self {
            LikeSubject::Post => "post_id",
            LikeSubject::Comment => "comment_id",
        }
    }

    pub(crate) fn counter_table(self) -> &'static str {
        match self {
            LikeSubject::Post => "posts",
            LikeSubject::Comment => "comments",
        }
    }
}

/// `PUT .../like-status` body
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LikeInput {
    #[serde(default, deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "likeStatus is required"))]
    pub like_status: String,
}

impl LikeInput {
    pub fn status(&self) -> Option<LikeStatus> {
        self.like_status.parse().ok()
    }
}

/// Recent LIKE on a post, as listed in `extendedLikesInfo.newestLikes`
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NewestLike {
    pub added_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub login: String,
    #[serde(skip)]
    pub post_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use LikeStatus::*;

    #[test]
    fn test_transition_table() {
        let cases = [
            (None, Like, (1, 0)),
            (None, Dislike, (0, 1)),
            (Like, None, (-1, 0)),
            (Like, Dislike, (-1, 1)),
            (Dislike, None, (0, -1)),
            (Dislike, Like, (1, -1)),
        ];
        for (prior, next, (likes, dislikes)) in cases {
            assert_eq!(
                LikeStatus::transition(prior, next),
                LikeDelta::new(likes, dislikes),
                "{prior} -> {next}"
            );
        }
    }

    #[test]
    fn test_same_status_is_noop() {
        for status in [None, Like, Dislike] {
            assert!(LikeStatus::transition(status, status).is_zero());
        }
    }

    #[test]
    fn test_round_trip_transitions_cancel_out() {
        for a in [None, Like, Dislike] {
            for b in [None, Like, Dislike] {
                let there = LikeStatus::transition(a, b);
                let back = LikeStatus::transition(b, a);
                assert_eq!(there.likes + back.likes, 0);
                assert_eq!(there.dislikes + back.dislikes, 0);
            }
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Dislike).unwrap(), "\"Dislike\"");
        assert_eq!("Like".parse::<LikeStatus>().unwrap(), Like);
        assert!("like".parse::<LikeStatus>().is_err());
        assert!("".parse::<LikeStatus>().is_err());
    }
}
