/// Service layer: business rules between handlers and repositories
pub mod auth_service;
pub mod comment_service;
pub mod device_service;
pub mod email_service;
pub mod like_service;
pub mod post_service;
pub mod user_service;

pub use email_service::EmailService;
