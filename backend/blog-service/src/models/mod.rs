//! Database rows, API views and request bodies
//!
//! Rows derive `sqlx::FromRow`; views serialize with camelCase field names;
//! request bodies derive `validator::Validate`.

pub mod auth;
pub mod blog;
pub mod comment;
pub mod device;
pub mod like;
pub mod pagination;
pub mod post;
pub mod user;

pub use blog::{Blog, BlogInput, BlogView};
pub use comment::{Comment, CommentInput, CommentView};
pub use device::{DeviceSession, DeviceView};
pub use like::{LikeDelta, LikeInput, LikeStatus, LikeSubject, NewestLike};
pub use pagination::{ListQuery, PageParams, Paginator, SortDirection};
pub use post::{BlogPostInput, Post, PostInput, PostView};
pub use user::{MeView, User, UserInput, UserView};
