//! Route configuration
//!
//! Auth per route comes from extractors: `AdminAuth` (Basic), `UserId`
//! (Bearer, required) and `OptionalUserId` (Bearer, optional). The auth
//! endpoints that send mail or check credentials sit behind the rate limiter.

use actix_middleware::{metrics::metrics_handler, JwtAuthMiddleware, RateLimitMiddleware};
use actix_web::web;

use crate::handlers::{self, auth, blogs, comments, devices, posts, testing, users};

/// Configure all routes for the application
pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    rate_limit: RateLimitMiddleware,
    enable_testing: bool,
) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(handlers::query_error_handler))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(handlers::health::health_check))
        .service(
            web::scope("/blogs")
                .service(
                    web::resource("")
                        .route(web::get().to(blogs::list_blogs))
                        .route(web::post().to(blogs::create_blog)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(blogs::get_blog))
                        .route(web::put().to(blogs::update_blog))
                        .route(web::delete().to(blogs::delete_blog)),
                )
                .service(
                    web::resource("/{id}/posts")
                        .route(web::get().to(blogs::list_blog_posts))
                        .route(web::post().to(blogs::create_blog_post)),
                ),
        )
        .service(
            web::scope("/posts")
                .service(
                    web::resource("")
                        .route(web::get().to(posts::list_posts))
                        .route(web::post().to(posts::create_post)),
                )
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(posts::get_post))
                        .route(web::put().to(posts::update_post))
                        .route(web::delete().to(posts::delete_post)),
                )
                .service(
                    web::resource("/{id}/comments")
                        .route(web::get().to(posts::list_post_comments))
                        .route(web::post().to(posts::create_post_comment)),
                )
                .route("/{id}/like-status", web::put().to(posts::set_post_like_status)),
        )
        .service(
            web::scope("/comments")
                .service(
                    web::resource("/{id}")
                        .route(web::get().to(comments::get_comment))
                        .route(web::put().to(comments::update_comment))
                        .route(web::delete().to(comments::delete_comment)),
                )
                .route(
                    "/{id}/like-status",
                    web::put().to(comments::set_comment_like_status),
                ),
        )
        .service(
            web::scope("/users")
                .service(
                    web::resource("")
                        .route(web::get().to(users::list_users))
                        .route(web::post().to(users::create_user)),
                )
                .route("/{id}", web::delete().to(users::delete_user)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login")
                        .wrap(rate_limit.clone())
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/registration")
                        .wrap(rate_limit.clone())
                        .route(web::post().to(auth::registration)),
                )
                .service(
                    web::resource("/registration-confirmation")
                        .wrap(rate_limit.clone())
                        .route(web::post().to(auth::registration_confirmation)),
                )
                .service(
                    web::resource("/registration-email-resending")
                        .wrap(rate_limit.clone())
                        .route(web::post().to(auth::registration_email_resending)),
                )
                .service(
                    web::resource("/password-recovery")
                        .wrap(rate_limit.clone())
                        .route(web::post().to(auth::password_recovery)),
                )
                .service(
                    web::resource("/new-password")
                        .wrap(rate_limit)
                        .route(web::post().to(auth::new_password)),
                )
                .route("/refresh-token", web::post().to(auth::refresh_token))
                .route("/logout", web::post().to(auth::logout))
                .service(
                    web::resource("/me")
                        .wrap(JwtAuthMiddleware)
                        .route(web::get().to(auth::me)),
                ),
        )
        .service(
            web::scope("/security/devices")
                .service(
                    web::resource("")
                        .route(web::get().to(devices::list_devices))
                        .route(web::delete().to(devices::delete_other_devices)),
                )
                .route("/{deviceId}", web::delete().to(devices::delete_device)),
        );

    if enable_testing {
        cfg.route("/testing/all-data", web::delete().to(testing::clear_all_data));
    }
}
