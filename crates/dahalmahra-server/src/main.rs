//! Dahalmahra multiplayer game server.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod protocol;
mod room;
mod server;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        addr = %config.addr,
        next_round_delay_ms = config.next_round_delay.as_millis() as u64,
        "Starting Dahalmahra server..."
    );

    let addr = config.addr;
    let state = Arc::new(ServerState::new(config));

    server::run_server(addr, state).await
}
