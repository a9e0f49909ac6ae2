mod app;
mod cli;
mod error;
mod handlers;
mod model;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pinhole_generator::RandomGenerator;
use pinhole_shortener::ShortenerSettings;
use pinhole_storage::{InMemoryRepository, MySqlRepository};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::{Cli, LogFormatArg, StorageBackendArg};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        code_length = config.code_length,
        max_attempts = config.max_attempts,
        "starting pinhole gateway"
    );

    let generator = RandomGenerator::new(config.code_length)?;
    let settings = ShortenerSettings::builder()
        .max_attempts(config.max_attempts)
        .build();

    match config.storage {
        StorageBackendArg::InMemory => {
            let repository = Arc::new(InMemoryRepository::new());
            let state = AppState::new(repository, generator, settings, config.base_url);
            serve(config.listen_addr, state).await
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(&mysql_dsn).await?;
            repository.ensure_schema().await?;
            let state = AppState::new(Arc::new(repository), generator, settings, config.base_url);
            serve(config.listen_addr, state).await
        }
    }
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormatArg::Pretty => subscriber.init(),
        LogFormatArg::Json => subscriber.json().init(),
    }
}

async fn serve(listen_addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let router = App::router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
