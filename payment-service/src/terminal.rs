use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use common_money::NormalizedMoney;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const MAX_INSTALLMENTS: u8 = 12;
/// Approved NSUs the simulator keeps voidable; older sales fall out of the window.
pub const VOID_WINDOW: usize = 1024;

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("invalid card request: {0}")]
    InvalidRequest(String),
    #[error("terminal unavailable")]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardMethod {
    #[default]
    Credit,
    Debit,
}

fn one_installment() -> u8 { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct CardPaymentRequest {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub amount: BigDecimal,
    #[serde(default)]
    pub method: CardMethod,
    #[serde(default = "one_installment")]
    pub installments: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    Approved,
    Declined,
}

impl AuthorizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationStatus::Approved => "approved",
            AuthorizationStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TerminalReceipt {
    pub status: AuthorizationStatus,
    pub nsu: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_code: Option<String>,
    pub amount: String,
    pub method: CardMethod,
    pub installments: u8,
    pub message: String,
    pub processed_at: DateTime<Utc>,
}

/// Card terminal (TEF) seam. The store runs [`SimulatedTerminal`]; a real pinpad
/// integration would implement the same trait.
#[async_trait::async_trait]
pub trait PaymentTerminal: Send + Sync {
    async fn authorize(&self, req: &CardPaymentRequest) -> Result<TerminalReceipt, TerminalError>;
    async fn void(&self, nsu: &str) -> Result<Option<String>, TerminalError>;
}

pub struct SimulatedTerminal {
    latency: Duration,
    decline_above: Option<BigDecimal>,
    next_nsu: AtomicU64,
    void_window: usize,
    approved: Mutex<VecDeque<String>>,
}

impl SimulatedTerminal {
    pub fn new() -> Self {
        Self::with_settings(Duration::ZERO, None)
    }

    pub fn with_settings(latency: Duration, decline_above: Option<BigDecimal>) -> Self {
        Self {
            latency,
            decline_above,
            next_nsu: AtomicU64::new(1),
            void_window: VOID_WINDOW,
            approved: Mutex::new(VecDeque::new()),
        }
    }

    fn validate(req: &CardPaymentRequest) -> Result<NormalizedMoney, TerminalError> {
        let amount = NormalizedMoney::new(req.amount.clone());
        if amount.is_negative() || amount.is_zero() {
            return Err(TerminalError::InvalidRequest("amount must be positive".into()));
        }
        if req.installments == 0 || req.installments > MAX_INSTALLMENTS {
            return Err(TerminalError::InvalidRequest(format!(
                "installments must be between 1 and {MAX_INSTALLMENTS}"
            )));
        }
        if req.method == CardMethod::Debit && req.installments > 1 {
            return Err(TerminalError::InvalidRequest("debit does not allow installments".into()));
        }
        if req.order_id.trim().is_empty() {
            return Err(TerminalError::InvalidRequest("orderId is required".into()));
        }
        Ok(amount)
    }

    fn allocate_nsu(&self) -> String {
        let n = self.next_nsu.fetch_add(1, Ordering::Relaxed);
        // Zero-padded to six digits; wider once the sequence passes 999999.
        format!("{:06}", n)
    }
}

impl Default for SimulatedTerminal {
    fn default() -> Self { Self::new() }
}

#[async_trait::async_trait]
impl PaymentTerminal for SimulatedTerminal {
    async fn authorize(&self, req: &CardPaymentRequest) -> Result<TerminalReceipt, TerminalError> {
        let amount = Self::validate(req)?;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let nsu = self.allocate_nsu();
        let rendered = amount
            .to_plain_string()
            .map_err(|e| TerminalError::InvalidRequest(e.to_string()))?;

        let over_limit = self
            .decline_above
            .as_ref()
            .map(|limit| amount.inner() > limit)
            .unwrap_or(false);
        let (status, approval_code, message) = if over_limit {
            let message = "TRANSACAO NEGADA - LIMITE EXCEDIDO".to_string();
            (AuthorizationStatus::Declined, None, message)
        } else {
            let code = format!("SIM-{}", req.order_id.chars().take(8).collect::<String>());
            (AuthorizationStatus::Approved, Some(code), "TRANSACAO APROVADA".to_string())
        };
        if status == AuthorizationStatus::Approved {
            let mut approved = self.approved.lock().map_err(|_| TerminalError::Unavailable)?;
            if approved.len() >= self.void_window {
                approved.pop_front();
            }
            approved.push_back(nsu.clone());
        }
        info!(
            order_id = %req.order_id,
            %nsu,
            status = status.as_str(),
            amount = %rendered,
            "simulated terminal authorization"
        );

        Ok(TerminalReceipt {
            status,
            nsu,
            approval_code,
            amount: rendered,
            method: req.method,
            installments: req.installments,
            message,
            processed_at: Utc::now(),
        })
    }

    async fn void(&self, nsu: &str) -> Result<Option<String>, TerminalError> {
        let removed = {
            let mut approved = self.approved.lock().map_err(|_| TerminalError::Unavailable)?;
            match approved.iter().position(|n| n == nsu) {
                Some(idx) => approved.remove(idx).is_some(),
                None => false,
            }
        };
        if removed {
            info!(%nsu, "simulated terminal void");
            Ok(Some(format!("{}-void", nsu)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn card(order_id: &str) -> CardPaymentRequest {
        CardPaymentRequest {
            order_id: order_id.into(),
            amount: BigDecimal::from_str("10.00").unwrap(),
            method: CardMethod::Credit,
            installments: 1,
        }
    }

    #[tokio::test]
    async fn nsu_keeps_increasing_past_six_digits() {
        let terminal = SimulatedTerminal::new();
        terminal.next_nsu.store(999_999, Ordering::Relaxed);
        let last_six = terminal.authorize(&card("ORDER-A")).await.unwrap();
        let first_seven = terminal.authorize(&card("ORDER-B")).await.unwrap();
        assert_eq!(last_six.nsu, "999999");
        assert_eq!(first_seven.nsu, "1000000");
        // Both sales stay individually voidable.
        assert!(terminal.void("999999").await.unwrap().is_some());
        assert!(terminal.void("1000000").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn void_window_evicts_oldest_sale() {
        let terminal = SimulatedTerminal { void_window: 2, ..SimulatedTerminal::new() };
        let first = terminal.authorize(&card("ORDER-1")).await.unwrap();
        let second = terminal.authorize(&card("ORDER-2")).await.unwrap();
        let third = terminal.authorize(&card("ORDER-3")).await.unwrap();
        assert_eq!(terminal.approved.lock().unwrap().len(), 2);
        assert_eq!(terminal.void(&first.nsu).await.unwrap(), None);
        assert!(terminal.void(&second.nsu).await.unwrap().is_some());
        assert!(terminal.void(&third.nsu).await.unwrap().is_some());
    }
}
