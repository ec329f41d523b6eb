use crate::pix::{PayloadKind, PixPayloadBuilder, PixPaymentRequest};
use crate::terminal::{CardPaymentRequest, TerminalError, TerminalReceipt};
use crate::AppState;
use axum::{extract::State, Json};
use bigdecimal::BigDecimal;
use common_http_errors::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Checkout-side PIX request. Merchant identity fields fall back to the store defaults.
#[derive(Debug, Deserialize)]
pub struct PixChargeRequest {
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub amount: Option<BigDecimal>,
    #[serde(default)]
    pub payer_document: Option<String>,
    #[serde(default)]
    pub kind: PayloadKind,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PixChargeResponse {
    pub payload: String,
    pub crc: String,
    pub kind: PayloadKind,
}

pub async fn create_pix_payload(
    State(state): State<AppState>,
    Json(req): Json<PixChargeRequest>,
) -> ApiResult<Json<PixChargeResponse>> {
    let defaults = &state.pix_defaults;
    let request = PixPaymentRequest {
        merchant_name: req.merchant_name.or_else(|| defaults.merchant_name.clone()).unwrap_or_default(),
        city: req.city.or_else(|| defaults.city.clone()).unwrap_or_default(),
        key: req.key.or_else(|| defaults.key.clone()).unwrap_or_default(),
        amount: req.amount,
        payer_document: req.payer_document,
        kind: req.kind,
        txid: req.txid,
        description: req.description,
    };

    let payload = PixPayloadBuilder::build(&request).map_err(|e| {
        state.metrics.pix_validation_failures.inc();
        warn!(error = %e, "Rejected pix request");
        ApiError::invalid("invalid_pix_request", e)
    })?;
    state.metrics.pix_payloads_built.inc();
    info!(kind = ?request.kind, crc = payload.checksum(), "Built pix payload");

    Ok(Json(PixChargeResponse {
        crc: payload.checksum().to_string(),
        payload: payload.into_string(),
        kind: request.kind,
    }))
}

pub async fn process_card_payment(
    State(state): State<AppState>,
    Json(req): Json<CardPaymentRequest>,
) -> ApiResult<Json<TerminalReceipt>> {
    let receipt = state.terminal.authorize(&req).await.map_err(|e| match e {
        TerminalError::InvalidRequest(_) => ApiError::invalid("invalid_card_request", e),
        TerminalError::Unavailable => ApiError::internal(e, None),
    })?;
    state
        .metrics
        .terminal_authorizations
        .with_label_values(&[receipt.status.as_str()])
        .inc();
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
pub struct VoidRequest {
    pub nsu: String,
}

#[derive(Debug, Serialize)]
pub struct VoidResponse {
    pub status: &'static str,
    pub reference: String,
}

pub async fn void_card_payment(
    State(state): State<AppState>,
    Json(req): Json<VoidRequest>,
) -> ApiResult<Json<VoidResponse>> {
    match state.terminal.void(&req.nsu).await {
        Ok(Some(reference)) => Ok(Json(VoidResponse { status: "voided", reference })),
        Ok(None) => Err(ApiError::NotFound { code: "payment_not_found", trace_id: None }),
        Err(e) => Err(ApiError::internal(e, None)),
    }
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> ApiResult<String> {
    state.metrics.render().map_err(|e| ApiError::internal(e, None))
}

pub async fn health() -> &'static str {
    "ok"
}
