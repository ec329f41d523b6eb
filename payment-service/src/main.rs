use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use common_money::log_rounding_mode_once;
use payment_service::{build_router, config::PaymentConfig, terminal::SimulatedTerminal, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    log_rounding_mode_once();

    let config = PaymentConfig::from_env()?;
    if config.pix.key.is_none() {
        warn!("PIX_KEY not set; pix requests must carry their own key");
    }
    let terminal = SimulatedTerminal::with_settings(
        config.terminal_latency,
        config.terminal_decline_above.clone(),
    );
    let state = AppState::new(Arc::new(terminal), config.pix.clone());

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
    info!(%addr, "starting payment-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
