use prometheus::{Encoder, IntCounter, IntCounterVec, Registry, TextEncoder};

#[derive(Clone)]
pub struct StockAlertMetrics {
    pub registry: Registry,
    pub evaluations: IntCounter,
    pub alerts_emitted: IntCounter,
    pub records_skipped: IntCounter,
    pub notify_failures: IntCounter,
    pub http_errors_total: IntCounterVec,
}

impl StockAlertMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let evaluations = IntCounter::new(
            "stock_evaluations_total",
            "Low-stock evaluations performed",
        ).unwrap();
        let alerts_emitted = IntCounter::new(
            "stock_alerts_emitted_total",
            "Low-stock alerts produced across evaluations",
        ).unwrap();
        let records_skipped = IntCounter::new(
            "stock_records_skipped_total",
            "Inventory records skipped because of malformed quantity",
        ).unwrap();
        let notify_failures = IntCounter::new(
            "stock_alert_notify_failures_total",
            "Low-stock webhook deliveries that failed",
        ).unwrap();
        let http_errors_total = http_errors_vec();
        let _ = registry.register(Box::new(evaluations.clone()));
        let _ = registry.register(Box::new(alerts_emitted.clone()));
        let _ = registry.register(Box::new(records_skipped.clone()));
        let _ = registry.register(Box::new(notify_failures.clone()));
        let _ = registry.register(Box::new(http_errors_total.clone()));
        StockAlertMetrics { registry, evaluations, alerts_emitted, records_skipped, notify_failures, http_errors_total }
    }

    pub fn render(&self) -> Result<String, String> { render(&self.registry) }
}

impl Default for StockAlertMetrics {
    fn default() -> Self { Self::new() }
}

#[derive(Clone)]
pub struct PaymentMetrics {
    pub registry: Registry,
    pub pix_payloads_built: IntCounter,
    pub pix_validation_failures: IntCounter,
    pub terminal_authorizations: IntCounterVec,
    pub http_errors_total: IntCounterVec,
}

impl PaymentMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let pix_payloads_built = IntCounter::new(
            "pix_payloads_built_total",
            "PIX payloads successfully built",
        ).unwrap();
        let pix_validation_failures = IntCounter::new(
            "pix_validation_failures_total",
            "PIX requests rejected by validation",
        ).unwrap();
        let terminal_authorizations = IntCounterVec::new(
            prometheus::Opts::new(
                "terminal_authorizations_total",
                "Card terminal authorizations by outcome"
            ),
            &["status"]
        ).unwrap();
        let http_errors_total = http_errors_vec();
        let _ = registry.register(Box::new(pix_payloads_built.clone()));
        let _ = registry.register(Box::new(pix_validation_failures.clone()));
        let _ = registry.register(Box::new(terminal_authorizations.clone()));
        let _ = registry.register(Box::new(http_errors_total.clone()));
        PaymentMetrics { registry, pix_payloads_built, pix_validation_failures, terminal_authorizations, http_errors_total }
    }

    pub fn render(&self) -> Result<String, String> { render(&self.registry) }
}

impl Default for PaymentMetrics {
    fn default() -> Self { Self::new() }
}

fn http_errors_vec() -> IntCounterVec {
    IntCounterVec::new(
        prometheus::Opts::new(
            "http_errors_total",
            "Count of HTTP error responses emitted (status >= 400)"
        ),
        &["service", "code", "status"]
    ).unwrap()
}

/// Prometheus text exposition of every family in `registry`.
pub fn render(registry: &Registry) -> Result<String, String> {
    let encoder = TextEncoder::new();
    let families = registry.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf).map_err(|e| format!("metrics encode error: {e}"))?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}
