//! `serve` command: run the transport server until interrupted.

use color_eyre::Result;

use crate::adapters::producer_from_config;
use crate::config::Config;
use crate::server;

pub async fn handle_serve_command(config: &Config) -> Result<()> {
    let addr = config.listen_addr()?;
    let producer = producer_from_config(config);

    server::serve(addr, producer, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
