//! RVM kiosk - console front end for the reverse vending machine
//!
//! Main entry point: loads configuration, starts the synchronization core
//! and hands the terminal to the console loop.

use std::sync::Arc;

use anyhow::Context;
use rvm_kiosk::utils::{console, logging};
use rvm_kiosk::KioskContext;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first so RVM_* and RUST_LOG from .env are honoured
    let dotenv = dotenvy::dotenv();

    let config = rvm_infra::config::load().context("failed to load configuration")?;
    logging::init(config.logging.format)?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(err) => debug!(error = %err, "No .env file loaded"),
    }

    info!(base_url = %config.api.base_url, "RVM kiosk starting");

    let ctx = Arc::new(KioskContext::new(config).await.context("failed to start kiosk")?);

    let result = console::run(Arc::clone(&ctx)).await;
    ctx.shutdown().await.context("failed to shut down cleanly")?;

    info!("RVM kiosk stopped");
    result
}
