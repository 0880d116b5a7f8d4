use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use futures::future::{ready, Ready};
use prometheus::{Encoder, HistogramVec, IntCounterVec, TextEncoder};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Instant;

/// Prometheus Metrics Middleware
///
/// Paths are labelled by their route pattern (`/posts/{id}`), not the raw
/// URI, so ids do not explode label cardinality.
pub struct MetricsMiddleware;

lazy_static::lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = prometheus::register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    ).expect("http_requests_total registration");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = prometheus::register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latency",
        &["method", "path", "status"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).expect("http_request_duration_seconds registration");
}

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = MetricsMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());

        Box::pin(async move {
            let res = service.call(req).await;
            // Errors from inner middleware are counted with the status they render as
            let status = match &res {
                Ok(res) => res.status(),
                Err(e) => e.as_response_error().status_code(),
            }
            .as_u16()
            .to_string();
            let duration = start.elapsed().as_secs_f64();

            HTTP_REQUESTS_TOTAL
                .with_label_values(&[&method, &path, &status])
                .inc();

            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&[&method, &path, &status])
                .observe(duration);

            res
        })
    }
}

/// Prometheus text exposition of the default registry.
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// `GET /metrics` handler
pub async fn metrics_handler() -> HttpResponse {
    match render_metrics() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{dev::Service as _, error, test, web, App};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_web::test]
    async fn test_requests_are_counted_by_pattern() {
        let app = test::init_service(
            App::new()
                .wrap(MetricsMiddleware)
                .route("/things/{id}", web::get().to(ok))
                .route("/metrics", web::get().to(metrics_handler)),
        )
        .await;

        let req = test::TestRequest::get().uri("/things/42").to_request();
        test::call_service(&app, req).await;

        let count = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/things/{id}", "200"])
            .get();
        assert!(count >= 1);

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("http_requests_total"));
    }

    #[actix_web::test]
    async fn test_inner_errors_are_counted() {
        let app = test::init_service(
            App::new()
                .wrap_fn(|_req, _srv| {
                    std::future::ready(Err::<ServiceResponse, _>(error::ErrorServiceUnavailable(
                        "down",
                    )))
                })
                .wrap(MetricsMiddleware)
                .route("/failing", web::delete().to(ok)),
        )
        .await;

        let labels = ["DELETE", "/failing", "503"];
        let before = HTTP_REQUESTS_TOTAL.with_label_values(&labels).get();

        let req = test::TestRequest::delete().uri("/failing").to_request();
        assert!(app.call(req).await.is_err());

        assert_eq!(HTTP_REQUESTS_TOTAL.with_label_values(&labels).get(), before + 1);
        assert!(
            HTTP_REQUEST_DURATION_SECONDS
                .with_label_values(&labels)
                .get_sample_count()
                >= 1
        );
    }
}
