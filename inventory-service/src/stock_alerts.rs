//! Low-stock detection over an inventory snapshot.
//!
//! The evaluator is a pure function of its input plus one configured value, the
//! threshold applied to records that carry none. Records whose quantity cannot be
//! read are skipped so that one bad line never blocks alerting on the others.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_THRESHOLD: u64 = 10;

/// One inventory line as handed over by the persistence layer.
///
/// `quantity` and `threshold` stay loosely typed: upstream rows may carry numbers,
/// numeric strings or nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub threshold: Value,
}

impl ProductStockRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u64, threshold: Option<u64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity: Value::from(quantity),
            threshold: threshold.map(Value::from).unwrap_or(Value::Null),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u64,
    pub threshold: u64,
    pub shortfall: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlertReport {
    pub alerts: Vec<StockAlert>,
    pub evaluated: usize,
    pub skipped: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkipReason {
    #[error("quantity missing")]
    MissingQuantity,
    #[error("quantity is not a non-negative integer: {0}")]
    InvalidQuantity(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAlertEvaluator {
    default_threshold: u64,
}

impl Default for StockAlertEvaluator {
    fn default() -> Self { Self::new(DEFAULT_THRESHOLD) }
}

impl StockAlertEvaluator {
    pub fn new(default_threshold: u64) -> Self {
        Self { default_threshold }
    }

    pub fn default_threshold(&self) -> u64 { self.default_threshold }

    /// Alerts for every record strictly below its threshold, in input order.
    pub fn evaluate(&self, records: &[ProductStockRecord]) -> Vec<StockAlert> {
        self.evaluate_report(records).alerts
    }

    pub fn evaluate_report(&self, records: &[ProductStockRecord]) -> StockAlertReport {
        let mut report = StockAlertReport { evaluated: records.len(), ..Default::default() };
        for record in records {
            match self.check(record) {
                Ok(Some(alert)) => report.alerts.push(alert),
                Ok(None) => {}
                Err(reason) => {
                    debug!(product_id = %record.id, %reason, "skipping inventory record");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Evaluate a single record. `Ok(None)` means stock is at or above the threshold.
    pub fn check(&self, record: &ProductStockRecord) -> Result<Option<StockAlert>, SkipReason> {
        let quantity = match &record.quantity {
            Value::Null => return Err(SkipReason::MissingQuantity),
            other => coerce_count(other).ok_or_else(|| SkipReason::InvalidQuantity(other.to_string()))?,
        };
        let threshold = coerce_count(&record.threshold).unwrap_or(self.default_threshold);
        if quantity >= threshold {
            return Ok(None);
        }
        Ok(Some(StockAlert {
            product_id: record.id.clone(),
            product_name: record.name.clone(),
            quantity,
            threshold,
            shortfall: threshold - quantity,
        }))
    }
}

/// Non-negative integer from a JSON number or numeric string.
fn coerce_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
