use anyhow::{bail, Context, Result};
use bigdecimal::{BigDecimal, Zero};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Store-wide PIX identity, used when a checkout request leaves a field out.
#[derive(Debug, Clone, Default)]
pub struct PixDefaults {
    pub merchant_name: Option<String>,
    pub city: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub host: String,
    pub port: u16,
    pub pix: PixDefaults,
    pub terminal_latency: Duration,
    pub terminal_decline_above: Option<BigDecimal>,
}

impl PaymentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => 8086,
        };
        let pix = PixDefaults {
            merchant_name: non_blank("PIX_MERCHANT_NAME"),
            city: non_blank("PIX_MERCHANT_CITY"),
            key: non_blank("PIX_KEY"),
        };
        let terminal_latency_ms = lookup("TEF_SIM_LATENCY_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0);
        let terminal_decline_above = match non_blank("TEF_SIM_DECLINE_ABOVE") {
            Some(raw) => {
                let limit = BigDecimal::from_str(raw.trim())
                    .with_context(|| format!("TEF_SIM_DECLINE_ABOVE must be a decimal amount, got {raw:?}"))?;
                if limit <= BigDecimal::zero() {
                    bail!("TEF_SIM_DECLINE_ABOVE must be positive, got {raw:?}");
                }
                Some(limit)
            }
            None => None,
        };

        Ok(Self {
            host,
            port,
            pix,
            terminal_latency: Duration::from_millis(terminal_latency_ms.min(30_000)),
            terminal_decline_above,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse().with_context(|| format!("HOST is not an IP address: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
