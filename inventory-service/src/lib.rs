pub mod alert_handlers;
pub mod config;
pub mod notifier;
pub mod stock_alerts;

pub use crate::stock_alerts::{
    ProductStockRecord, StockAlert, StockAlertEvaluator, StockAlertReport, DEFAULT_THRESHOLD,
};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use common_http_errors::{track_http_errors, ErrorMetrics};
use common_observability::StockAlertMetrics;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "inventory-service";

#[derive(Clone)]
pub struct AppState {
    pub evaluator: StockAlertEvaluator,
    pub webhook: Option<Arc<notifier::AlertWebhook>>,
    pub metrics: Arc<StockAlertMetrics>,
}

impl AppState {
    pub fn new(evaluator: StockAlertEvaluator) -> Self {
        Self { evaluator, webhook: None, metrics: Arc::new(StockAlertMetrics::new()) }
    }

    pub fn with_webhook(mut self, webhook: notifier::AlertWebhook) -> Self {
        self.webhook = Some(Arc::new(webhook));
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let error_metrics = ErrorMetrics {
        service: SERVICE_NAME,
        counter: state.metrics.http_errors_total.clone(),
    };
    Router::new()
        .route("/healthz", get(alert_handlers::health))
        .route("/metrics", get(alert_handlers::metrics_endpoint))
        .route("/inventory/alerts/evaluate", post(alert_handlers::evaluate_alerts))
        .with_state(state)
        .layer(middleware::from_fn_with_state(error_metrics, track_http_errors))
}
