//! Signal Relay - Main Entry Point
//!
//! Listens for trading alerts over HTTP and relays them as limit orders
//! to the configured exchanges.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use signal_relay::config::{load_config, load_from_env, AppSettings};
use signal_relay::{
    AlertRouter, ExchangeRegistry, FillSupervisor, PositionBook, PositionExporter, PositionPoller,
    RelayServer,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file; legacy environment variables are used when it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the configured level
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format (text, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: String,
}

fn init_logging(args: &Args, settings: &AppSettings) -> Result<()> {
    let level = settings.effective_log_level(args.log_level.as_deref());

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if args.log_format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.with_thread_ids(true).finish())?;
    }
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }

    shutdown.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // settings carry the configured log level
    let from_file = Path::new(&args.config).exists();
    let config = if from_file {
        load_config(Some(args.config.as_str()))?
    } else {
        load_from_env()?
    };
    init_logging(&args, &config.settings)?;

    info!("Starting Signal Relay");
    if from_file {
        info!("Configuration file: {}", args.config);
    } else {
        info!("No {} found, read legacy environment variables", args.config);
    }
    let config = Arc::new(config);

    let registry = Arc::new(ExchangeRegistry::from_config(&config)?);
    if registry.is_empty() {
        warn!("No exchange has credentials configured; every alert will fail");
    }

    let book = Arc::new(PositionBook::new());
    let shutdown = CancellationToken::new();

    let poller = PositionPoller::new(
        registry.clone(),
        book.clone(),
        PositionExporter::new(&config.settings.export_dir),
        config.settings.poll_interval(),
    )
    .spawn(shutdown.clone());

    let router = Arc::new(AlertRouter::new(
        config.clone(),
        registry,
        book,
        FillSupervisor::new(shutdown.clone()),
    ));

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tokio::spawn(shutdown_signal(shutdown.clone()));
    RelayServer::new(router).serve(listener, shutdown).await?;

    poller.await?;
    info!("Signal Relay stopped");
    Ok(())
}
