mod config;
mod converter;
mod errors;
mod handlers;
mod media;
mod schema;
mod utils;
mod workspace;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::{
    config::Config,
    converter::Converter,
    schema::{AppState, schema},
    workspace::Workspace,
};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    pretty_env_logger::init();

    if let Err(e) = run().await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    log::info!("Starting media converter with {:?}", config);

    let workspace = Workspace::create(&config.download_dir).await?;
    // leftovers from a previous run
    match workspace.sweep().await {
        Ok(removed) => log::info!("Startup sweep removed {} entries", removed),
        Err(e) => log::error!("Startup sweep of {} failed: {}", workspace.root().display(), e),
    }

    let sweeper = config
        .sweep_interval
        .map(|every| workspace.spawn_periodic_sweep(every));

    let converter = Converter::from_config(&config, workspace.clone());
    let app = schema(AppState {
        converter: Arc::new(converter),
    });

    let listener = TcpListener::bind(&config.bind_addr).await?;
    log::info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await?;

    if let Some(task) = sweeper {
        task.abort();
    }
    workspace.sweep().await?;
    Ok(())
}

/// Resolves when `signal` fires. If the handler cannot be installed it never resolves.
async fn shutdown_signal(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        log::error!("Could not listen for Ctrl-C, graceful shutdown is disabled: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down...");
}

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use super::*;

    #[tokio::test]
    async fn shutdown_follows_the_signal() {
        let fired = tokio::time::timeout(Duration::from_secs(1), shutdown_signal(async { Ok(()) })).await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn broken_signal_handler_keeps_the_server_running() {
        let broken = shutdown_signal(async { Err(io::Error::other("no signal handler")) });
        let fired = tokio::time::timeout(Duration::from_millis(100), broken).await;
        assert!(fired.is_err());
    }
}
