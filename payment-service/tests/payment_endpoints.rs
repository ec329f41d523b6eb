use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use payment_service::config::PixDefaults;
use payment_service::terminal::SimulatedTerminal;
use payment_service::{build_router, AppState, PixPayload};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with_defaults() -> (Router, AppState) {
    let defaults = PixDefaults {
        merchant_name: Some("Loja Exemplo".into()),
        city: Some("Recife".into()),
        key: Some("a@b.com".into()),
    };
    let state = AppState::new(Arc::new(SimulatedTerminal::new()), defaults);
    (build_router(state.clone()), state)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn pix_uses_store_defaults() {
    let (app, state) = app_with_defaults();
    let resp = app.oneshot(post("/payments/pix", json!({ "amount": "12.50" }))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    let payload = v["payload"].as_str().unwrap();
    assert!(PixPayload::verify(payload));
    assert_eq!(v["crc"], "328A");
    assert_eq!(v["kind"], "fixed");
    assert_eq!(state.metrics.pix_payloads_built.get(), 1);
}

#[tokio::test]
async fn pix_without_key_is_rejected() {
    let state = AppState::simulated();
    let metrics = state.metrics.clone();
    let app = build_router(state);
    let body = json!({ "merchant_name": "Loja", "city": "Recife", "amount": "1.00" });
    let resp = app.oneshot(post("/payments/pix", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_pix_request");
    let v = json_body(resp).await;
    assert_eq!(v["message"], "recipient key is required");
    assert_eq!(metrics.pix_validation_failures.get(), 1);
    assert_eq!(
        metrics.http_errors_total.with_label_values(&["payment-service", "invalid_pix_request", "400"]).get(),
        1
    );
}

#[tokio::test]
async fn open_pix_omits_amount() {
    let (app, _) = app_with_defaults();
    let resp = app
        .oneshot(post("/payments/pix", json!({ "kind": "open", "amount": "3.00" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert!(!v["payload"].as_str().unwrap().contains("54043.00"));
    assert_eq!(v["kind"], "open");
}

#[tokio::test]
async fn card_payment_then_void() {
    let (app, state) = app_with_defaults();
    let resp = app
        .clone()
        .oneshot(post("/payments/card", json!({ "orderId": "a1b2c3d4e5", "amount": "42.00", "installments": 2 })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt = json_body(resp).await;
    assert_eq!(receipt["status"], "approved");
    assert_eq!(receipt["approval_code"], "SIM-a1b2c3d4");
    assert_eq!(receipt["installments"], 2);
    let nsu = receipt["nsu"].as_str().unwrap().to_string();
    assert_eq!(
        state.metrics.terminal_authorizations.with_label_values(&["approved"]).get(),
        1
    );

    let resp = app.clone().oneshot(post("/payments/card/void", json!({ "nsu": nsu }))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;
    assert_eq!(v["status"], "voided");

    let resp = app.oneshot(post("/payments/card/void", json!({ "nsu": nsu }))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "payment_not_found");
}

#[tokio::test]
async fn invalid_card_request_maps_to_bad_request() {
    let (app, _) = app_with_defaults();
    let resp = app
        .oneshot(post("/payments/card", json!({ "orderId": "x", "amount": "-5" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_card_request");
}

#[tokio::test]
async fn healthz_ok() {
    let (app, _) = app_with_defaults();
    let resp = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
