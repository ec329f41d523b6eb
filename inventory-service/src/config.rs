use crate::stock_alerts::DEFAULT_THRESHOLD;
use anyhow::{Context, Result};
use std::env;
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub host: String,
    pub port: u16,
    pub default_threshold: u64,
    pub webhook_url: Option<String>,
    pub webhook_bearer: Option<String>,
    pub webhook_timeout_secs: u64,
}

impl InventoryConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => 8087,
        };
        let default_threshold = lookup("LOW_STOCK_DEFAULT_THRESHOLD")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_THRESHOLD);
        let webhook_url = lookup("LOW_STOCK_WEBHOOK_URL").filter(|v| !v.trim().is_empty());
        let webhook_bearer = lookup("LOW_STOCK_WEBHOOK_BEARER").filter(|v| !v.trim().is_empty());
        let webhook_timeout_secs = lookup("LOW_STOCK_WEBHOOK_TIMEOUT_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(5);

        Ok(Self {
            host,
            port,
            default_threshold,
            webhook_url,
            webhook_bearer,
            webhook_timeout_secs: webhook_timeout_secs.max(1),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().with_context(|| format!("HOST is not an IP address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
