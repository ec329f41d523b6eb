pub mod config;
pub mod crc;
pub mod payment_handlers;
pub mod pix;
pub mod terminal;

pub use crate::pix::{
    PayloadKind, PixPayload, PixPayloadBuilder, PixPaymentRequest, ValidationError,
};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use common_http_errors::{track_http_errors, ErrorMetrics};
use common_observability::PaymentMetrics;
use std::sync::Arc;

use crate::config::PixDefaults;
use crate::terminal::{PaymentTerminal, SimulatedTerminal};

pub const SERVICE_NAME: &str = "payment-service";

#[derive(Clone)]
pub struct AppState {
    pub terminal: Arc<dyn PaymentTerminal>,
    pub pix_defaults: PixDefaults,
    pub metrics: Arc<PaymentMetrics>,
}

impl AppState {
    pub fn new(terminal: Arc<dyn PaymentTerminal>, pix_defaults: PixDefaults) -> Self {
        Self { terminal, pix_defaults, metrics: Arc::new(PaymentMetrics::new()) }
    }

    /// Simulated terminal and no PIX defaults.
    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedTerminal::new()), PixDefaults::default())
    }
}

pub fn build_router(state: AppState) -> Router {
    let error_metrics = ErrorMetrics {
        service: SERVICE_NAME,
        counter: state.metrics.http_errors_total.clone(),
    };
    Router::new()
        .route("/healthz", get(payment_handlers::health))
        .route("/metrics", get(payment_handlers::metrics_endpoint))
        .route("/payments/pix", post(payment_handlers::create_pix_payload))
        .route("/payments/card", post(payment_handlers::process_card_payment))
        .route("/payments/card/void", post(payment_handlers::void_card_payment))
        .with_state(state)
        .layer(middleware::from_fn_with_state(error_metrics, track_http_errors))
}
