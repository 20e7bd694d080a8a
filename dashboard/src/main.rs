use anyhow::Context;
use dashboard::api::server;
use dashboard::DashboardConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output, RUST_LOG=info for normal)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env().context("Failed to load configuration")?;

    log::info!("Starting Algorand wallet dashboard on {}", config.bind_address);
    server::start_server(config).await?;
    Ok(())
}
