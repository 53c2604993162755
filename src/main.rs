//! SendShield API server
//!
//! Screens a recipient address before funds are sent and answers with a
//! 0-100 risk score plus an allow/block decision.
//!
//! Usage:
//!   cargo run --bin sendshield_api
//!
//! Environment:
//!   SHIELD_RPC_URL        - JSON-RPC endpoint URL (required for /check)
//!   SHIELD_BLOCKLIST      - comma-separated blocked addresses
//!   SHIELD_WATCHLIST      - comma-separated watched addresses
//!   SHIELD_NEGATIVE_LINKS - JSON map of address/ENS name to reputation label
//!   SHIELD_DUST_THRESHOLD - dust cutoff in native units (default 0.00002)
//!   SHIELD_HOST           - bind host (default 0.0.0.0)
//!   PORT / SHIELD_PORT    - bind port (default 8080)
//!   RUST_LOG              - log filter (default info)

use std::net::SocketAddr;
use std::sync::Arc;

use sendshield::api::{create_router, handlers::AppState};
use sendshield::models::config::ShieldConfig;
use sendshield::utils::constants::{APP_NAME, APP_VERSION};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("{} v{}", APP_NAME, APP_VERSION);

    let config = ShieldConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(AppState::new(&config)?);
    let app = create_router(state);

    info!("listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET /check?address=0x..&chain=eth[&ens=name] - address risk assessment");
    info!("  GET /health                                  - liveness probe");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("{} shutdown complete", APP_NAME);
    Ok(())
}
