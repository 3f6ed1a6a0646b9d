use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use relay::{config::Cli, server::Server};
use relay_core::Registry;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => {
            info!("shutting down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let registry = Arc::new(Registry::new(cli.registry_config()));
    let addr = cli.bind_addr();

    let server = Server::bind(
        &addr,
        registry,
        cli.heartbeat,
        Duration::from_secs(cli.sweep),
    )
    .await
    .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    info!(addr = %server.local_addr()?, "relay listening");

    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    Ok(())
}
