//! Server configuration from the environment.

use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_NEXT_ROUND_DELAY_MS: u64 = 5000;

/// Runtime settings for the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on (`SERVER_ADDR`)
    pub addr: SocketAddr,
    /// Pause between a round ending and the next deal (`NEXT_ROUND_DELAY_MS`)
    pub next_round_delay: Duration,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr: SocketAddr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse()
            .context("SERVER_ADDR is not a socket address")?;

        let delay_ms: u64 = match lookup("NEXT_ROUND_DELAY_MS") {
            Some(raw) => raw
                .parse()
                .context("NEXT_ROUND_DELAY_MS is not a number of milliseconds")?,
            None => DEFAULT_NEXT_ROUND_DELAY_MS,
        };

        Ok(Self {
            addr,
            next_round_delay: Duration::from_millis(delay_ms),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            next_round_delay: Duration::from_millis(DEFAULT_NEXT_ROUND_DELAY_MS),
        }
    }
}
