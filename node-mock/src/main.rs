/// Algorand Mock Node
///
/// Serves account, pending, params, submit, TEAL compile and application
/// endpoints from an in-memory ledger. Designed for local development of the dashboard.

mod handlers;
mod ledger;
mod server;
mod types;

use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use std::time::Duration;

use ledger::Ledger;
use server::{run_server, spawn_confirmer};

#[derive(Debug)]
struct Config {
    genesis_id: String,
    api_key: Option<String>,

    // Pre-funded account
    fund_address: Option<String>,
    fund_microalgos: u64,

    /// Automatic round confirmation; off when zero
    confirm_interval_ms: u64,

    // Server
    server_host: String,
    server_port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let genesis_id = env::var("GENESIS_ID").unwrap_or_else(|_| "mocknet-v1.0".to_string());

        let api_key = env::var("BITQUERY_API_KEY").ok().filter(|k| !k.is_empty());

        let fund_address = env::var("FUND_ADDRESS").ok().filter(|a| !a.is_empty());

        let fund_microalgos = env::var("FUND_MICROALGOS")
            .unwrap_or_else(|_| "10000000".to_string())
            .parse()
            .context("Invalid FUND_MICROALGOS")?;

        let confirm_interval_ms = env::var("CONFIRM_INTERVAL_MS")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .context("Invalid CONFIRM_INTERVAL_MS")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "4001".to_string())
            .parse()
            .context("Invalid SERVER_PORT")?;

        Ok(Self {
            genesis_id,
            api_key,
            fund_address,
            fund_microalgos,
            confirm_interval_ms,
            server_host,
            server_port,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Algorand mock node...");

    let config = Config::from_env().context("Failed to load configuration")?;

    log::info!("Genesis: {}", config.genesis_id);
    log::info!("Server will listen on {}:{}", config.server_host, config.server_port);

    let ledger = Arc::new(Ledger::new(&config.genesis_id, config.api_key));

    if let Some(address) = &config.fund_address {
        ledger
            .fund(address, config.fund_microalgos)
            .context("Failed to fund account")?;
    }

    if config.confirm_interval_ms > 0 {
        log::info!("Confirming rounds every {} ms", config.confirm_interval_ms);
        spawn_confirmer(
            ledger.clone(),
            Duration::from_millis(config.confirm_interval_ms),
        );
    }

    run_server(ledger, config.server_host, config.server_port)
        .await
        .context("Server error")?;

    Ok(())
}
