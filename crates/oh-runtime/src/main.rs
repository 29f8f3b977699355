//! openHAB item runtime
//!
//! Usage: `openhab-rs [path/to/openhab.yaml]`
//!
//! Loads the configuration, seeds its items, logs every item's state and
//! runs until Ctrl-C.

use anyhow::{Context, Result};
use oh_config::RuntimeConfig;
use oh_runtime::OpenHab;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting openHAB item runtime");

    let config = match std::env::args().nth(1) {
        Some(path) => RuntimeConfig::load(&path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => {
            info!("No configuration file given, starting without items");
            RuntimeConfig::default()
        }
    };

    let openhab = OpenHab::from_config(config)
        .await
        .context("failed to initialize items")?;

    for name in openhab.items.item_names() {
        match openhab.display_state(name.as_str()) {
            Ok(Some(state)) => info!(item = %name, %state, "Item state"),
            Ok(None) => info!(item = %name, "Item has no state"),
            Err(e) => warn!(item = %name, error = %e, "Failed to resolve item state"),
        }
    }

    info!("openHAB item runtime is running");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    Ok(())
}
