use crate::stock_alerts::StockAlert;
use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct LowStockNotification<'a> {
    pub action: &'static str,
    pub count: usize,
    pub alerts: &'a [StockAlert],
    pub text: String,
}

/// Forwards low-stock alerts to an external webhook (chat channel, store manager inbox).
#[derive(Debug, Clone)]
pub struct AlertWebhook {
    client: Client,
    url: String,
    bearer: Option<String>,
}

impl AlertWebhook {
    pub fn new(url: impl Into<String>, bearer: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into(), bearer })
    }

    pub async fn post_low_stock_alerts(&self, alerts: &[StockAlert]) -> Result<()> {
        post_low_stock_alerts(&self.client, &self.url, self.bearer.as_deref(), alerts).await
    }
}

fn summary_text(alerts: &[StockAlert]) -> String {
    let names: Vec<String> = alerts
        .iter()
        .map(|a| format!("{} ({}/{})", a.product_name, a.quantity, a.threshold))
        .collect();
    format!("{} product(s) below minimum stock: {}", alerts.len(), names.join(", "))
}

pub async fn post_low_stock_alerts(
    client: &Client,
    url: &str,
    bearer: Option<&str>,
    alerts: &[StockAlert],
) -> Result<()> {
    if url.trim().is_empty() || alerts.is_empty() {
        return Ok(());
    }

    let body = LowStockNotification {
        action: "inventory.low_stock",
        count: alerts.len(),
        alerts,
        text: summary_text(alerts),
    };
    let mut req = client.post(url).json(&body);
    if let Some(token) = bearer {
        req = req.bearer_auth(token);
    }

    let response = req.send().await?;
    if !response.status().is_success() {
        warn!(status = ?response.status(), "Low-stock webhook returned failure status");
        return Err(anyhow!(
            "Low-stock webhook returned status {}",
            response.status()
        ));
    }

    info!(count = alerts.len(), "Posted low-stock alert webhook");
    Ok(())
}
