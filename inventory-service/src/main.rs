use anyhow::Context;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use inventory_service::{
    build_router, config::InventoryConfig, notifier::AlertWebhook, AppState, StockAlertEvaluator,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = InventoryConfig::from_env()?;
    let evaluator = StockAlertEvaluator::new(config.default_threshold);
    let mut state = AppState::new(evaluator);
    if let Some(url) = &config.webhook_url {
        let webhook = AlertWebhook::new(
            url.clone(),
            config.webhook_bearer.clone(),
            Duration::from_secs(config.webhook_timeout_secs),
        )
        .context("failed to build low-stock webhook client")?;
        state = state.with_webhook(webhook);
        info!(%url, "Low-stock webhook enabled");
    }

    let allowed_origins = [
        "http://localhost:3000",
        "http://localhost:3001",
        "http://localhost:5173",
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static("authorization"),
        ]);

    let app = build_router(state).layer(cors);

    let addr = config.socket_addr()?;
    info!(
        %addr,
        default_threshold = config.default_threshold,
        "starting inventory-service"
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
