use actix_middleware::{RateLimitConfig, RateLimitMiddleware};
use actix_web::{http::StatusCode, test, web, App, HttpResponse};

/// Simple test handler
async fn test_handler() -> HttpResponse {
    HttpResponse::Ok().body("success")
}

#[actix_web::test]
async fn test_rate_limit_exceeded() {
    let config = RateLimitConfig {
        max_requests: 2,
        window_seconds: 10,
        ..Default::default()
    };

    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(config))
            .route("/test", web::get().to(test_handler)),
    )
    .await;

    for _ in 0..2 {
        let req = test::TestRequest::get().uri("/test").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    // Third request should be rate limited
    let req = test::TestRequest::get().uri("/test").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
}

#[actix_web::test]
async fn test_limits_are_per_path_and_per_client() {
    let limiter = RateLimitMiddleware::new(RateLimitConfig {
        max_requests: 1,
        window_seconds: 10,
        trust_forwarded_for: true,
    });

    let app = test::init_service(
        App::new()
            .wrap(limiter)
            .route("/a", web::post().to(test_handler))
            .route("/b", web::post().to(test_handler)),
    )
    .await;

    let call = |uri: &'static str, ip: &'static str| {
        test::TestRequest::post()
            .uri(uri)
            .insert_header(("X-Forwarded-For", ip))
            .to_request()
    };

    assert_eq!(test::call_service(&app, call("/a", "198.51.100.1")).await.status(), StatusCode::OK);
    assert_eq!(
        test::call_service(&app, call("/a", "198.51.100.1")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(test::call_service(&app, call("/b", "198.51.100.1")).await.status(), StatusCode::OK);
    assert_eq!(test::call_service(&app, call("/a", "198.51.100.2")).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_forwarded_header_cannot_reset_budget() {
    let app = test::init_service(
        App::new()
            .wrap(RateLimitMiddleware::new(RateLimitConfig::default()))
            .route("/auth/login", web::post().to(test_handler)),
    )
    .await;

    let mut accepted = 0;
    for n in 0..20 {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .insert_header(("X-Forwarded-For", format!("203.0.113.{}", n)))
            .to_request();
        if test::call_service(&app, req).await.status().is_success() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 5);
}
