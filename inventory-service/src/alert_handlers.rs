use crate::stock_alerts::{ProductStockRecord, StockAlertReport};
use crate::AppState;
use axum::{extract::State, Json};
use common_http_errors::{ApiError, ApiResult};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub records: Vec<ProductStockRecord>,
}

pub async fn evaluate_alerts(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> ApiResult<Json<StockAlertReport>> {
    let report = state.evaluator.evaluate_report(&req.records);

    state.metrics.evaluations.inc();
    state.metrics.alerts_emitted.inc_by(report.alerts.len() as u64);
    state.metrics.records_skipped.inc_by(report.skipped as u64);
    info!(
        evaluated = report.evaluated,
        alerts = report.alerts.len(),
        skipped = report.skipped,
        "Evaluated inventory snapshot"
    );

    // Notification is best-effort: a failed delivery never changes the report.
    if let Some(webhook) = &state.webhook {
        if !report.alerts.is_empty() {
            if let Err(e) = webhook.post_low_stock_alerts(&report.alerts).await {
                state.metrics.notify_failures.inc();
                warn!(error = %e, "Failed to deliver low-stock notification");
            }
        }
    }

    Ok(Json(report))
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> ApiResult<String> {
    state.metrics.render().map_err(|e| ApiError::internal(e, None))
}

pub async fn health() -> &'static str {
    "ok"
}
