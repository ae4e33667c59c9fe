use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_gateway::{config, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ───────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── Config ────────────────────────────────────────────────
    let config = config::Config::from_env()?;
    tracing::info!(
        env = %config.app_env,
        backend = %config.backend_api_url,
        "Starting storefront gateway"
    );

    let addr: SocketAddr = format!("{}:{}", config.gateway_host, config.gateway_port).parse()?;

    // ── State ─────────────────────────────────────────────────
    let app_state = AppState::new(config)?;

    // ── Router ────────────────────────────────────────────────
    let app = storefront_gateway::app(app_state);
    tracing::info!(%addr, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
