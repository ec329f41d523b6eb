use common_http_errors::{track_http_errors, ApiError, ErrorMetrics};
use axum::{body::Body, http::{Request, StatusCode}, middleware, response::IntoResponse, routing::get, Router};
use prometheus::{IntCounterVec, Opts};
use tower::ServiceExt;
use uuid::Uuid;

#[test]
fn bad_request_variant() {
    let err = ApiError::BadRequest { code: "invalid_something", trace_id: None, message: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_something");
}

#[test]
fn not_found_variant() {
    let err = ApiError::NotFound { code: "missing_resource", trace_id: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "missing_resource");
}

#[test]
fn internal_variant() {
    let trace = Some(Uuid::new_v4());
    let err = ApiError::Internal { trace_id: trace, message: Some("boom".into()) };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "internal_error");
}

#[tokio::test]
async fn invalid_carries_message_in_body() {
    let resp = ApiError::invalid("invalid_pix_request", "recipient key is required").into_response();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["code"], "invalid_pix_request");
    assert_eq!(v["message"], "recipient key is required");
    assert!(v.get("trace_id").is_none());
}

async fn always_fails() -> Result<&'static str, ApiError> {
    Err(ApiError::bad_request("nope", None))
}

#[tokio::test]
async fn middleware_counts_error_responses() {
    let counter = IntCounterVec::new(Opts::new("http_errors_total", "errors"), &["service", "code", "status"]).unwrap();
    let metrics = ErrorMetrics { service: "test-svc", counter: counter.clone() };
    let app = Router::new()
        .route("/err", get(always_fails))
        .route("/ok", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(metrics, track_http_errors));

    for uri in ["/err", "/err", "/ok"] {
        let _ = app.clone().oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
    }
    assert_eq!(counter.with_label_values(&["test-svc", "nope", "400"]).get(), 2);
}
