use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::sync::Once;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("amount out of range")]
    OutOfRange,
}

fn half_cent() -> BigDecimal {
    BigDecimal::from(5i64) / BigDecimal::from(1000i64)
}

fn one_cent() -> BigDecimal {
    BigDecimal::from(1i64) / BigDecimal::from(100i64)
}

/// Normalize a monetary value to 2 decimal places using half-up rounding (ties move away from zero).
pub fn normalize_scale(value: &BigDecimal) -> BigDecimal {
    // with_scale truncates toward zero, so the remainder carries the sign of the value.
    let truncated = value.with_scale(2);
    let remainder = value - &truncated;
    if remainder.abs() < half_cent() {
        return truncated;
    }
    if *value < BigDecimal::zero() {
        (truncated - one_cent()).with_scale(2)
    } else {
        (truncated + one_cent()).with_scale(2)
    }
}

/// Integer minor units (cents) after normalization.
pub fn to_cents(value: &BigDecimal) -> Result<i64, MoneyError> {
    (normalize_scale(value) * BigDecimal::from(100i64))
        .with_scale(0)
        .to_i64()
        .ok_or(MoneyError::OutOfRange)
}

/// Render an amount with exactly two decimal digits, `.` as separator, no grouping and no symbol.
pub fn format_two_decimals(value: &BigDecimal) -> Result<String, MoneyError> {
    let cents = to_cents(value)?;
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    Ok(format!("{sign}{}.{:02}", abs / 100, abs % 100))
}

/// Emit the rounding policy once per process so operators can see it in service logs.
pub fn log_rounding_mode_once() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        tracing::info!(mode = "half-up", scale = 2, "money rounding policy");
    });
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedMoney(BigDecimal);

impl NormalizedMoney {
    pub fn new(raw: BigDecimal) -> Self {
        Self(normalize_scale(&raw))
    }
    pub fn inner(&self) -> &BigDecimal { &self.0 }
    pub fn is_negative(&self) -> bool { self.0 < BigDecimal::zero() }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
    pub fn to_plain_string(&self) -> Result<String, MoneyError> { format_two_decimals(&self.0) }
}

impl From<BigDecimal> for NormalizedMoney {
    fn from(value: BigDecimal) -> Self { Self::new(value) }
}
