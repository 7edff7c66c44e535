//! # unicon-client
//!
//! Headless runtime for the UNICON campus hub client. Runs the offline core
//! (durable action queue, connectivity monitor, replay worker, shell-asset
//! cache) and exposes it to a UI shell over the [`unicon_client::Client`]
//! handle.

use tracing::info;

use unicon_client::{Client, ClientConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    unicon_client::init_tracing();

    info!("Starting UNICON client core v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Start the client core and run until interrupted
    // -----------------------------------------------------------------------
    let client = Client::start(config).await?;

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, shutting down");

    client.shutdown().await;
    Ok(())
}
