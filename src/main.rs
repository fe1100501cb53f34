use clap::Parser;
use tracing_subscriber::EnvFilter;

use pylon::config::{CliArgs, Config};
use pylon::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_args(CliArgs::parse())?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!(
        listen = %cfg.listen_addr,
        directory = ?cfg.directory,
        "Starting pylon"
    );

    let server = Server::bind(cfg).await?;
    let shutdown = server.shutdown_handle();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.stop();
        }
    });

    server.run().await
}
