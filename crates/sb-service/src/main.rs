//! shellbot service daemon
//!
//! Accepts operator events from conversational front ends on the gateway
//! and drives one SSH session per authorized operator.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sb_bridge::SshConnector;
use sb_core::config::{self, ServiceConfig};
use sb_service::{AllowList, Dispatcher, GatewayServer};

#[derive(Parser)]
#[command(name = "shellbot")]
#[command(about = "shellbot - drive an SSH host from a chat conversation")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gateway bind address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Allow an operator identity (repeatable, adds to the config list)
    #[arg(short, long = "allow", value_name = "OPERATOR")]
    allow: Vec<String>,

    /// Write the effective configuration (file plus flags) to the config path and exit
    #[arg(long)]
    init_config: bool,

    /// Run in foreground with verbose output
    #[arg(short, long)]
    foreground: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.foreground { "debug" } else { args.log_level.as_str() };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("shellbot starting...");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) if config_path.exists() || !args.init_config => {
            config::load_config(config_path)
                .with_context(|| format!("Failed to load config from {:?}", config_path))?
        }
        // --init-config creating a new file
        Some(_) => ServiceConfig::default(),
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                config::load_config(&default_path).unwrap_or_else(|e| {
                    tracing::warn!("Failed to load config from {:?}: {}", default_path, e);
                    ServiceConfig::default()
                })
            } else {
                tracing::info!("Using default configuration");
                ServiceConfig::default()
            }
        }
    };

    // Flags override the file
    if let Some(bind) = args.bind {
        config.gateway_address = bind;
    }
    for operator in args.allow {
        if !config.allowed_operators.contains(&operator) {
            config.allowed_operators.push(operator);
        }
    }

    if args.init_config {
        let path = args.config.unwrap_or_else(config::default_config_path);
        config::save_config(&path, &config)
            .with_context(|| format!("Failed to write config to {:?}", path))?;
        tracing::info!("Wrote configuration to {:?}", path);
        return Ok(());
    }

    let allow_list = AllowList::new(config.allowed_operators.iter().cloned());
    if allow_list.is_empty() {
        tracing::warn!("No operators allowed - every event will be dropped");
    } else {
        tracing::info!("{} operators allowed", allow_list.len());
    }

    let connector = SshConnector::new(config.bridge.clone());
    let dispatcher = Arc::new(Dispatcher::new(connector, allow_list));

    // Create cancellation token for graceful shutdown
    let cancel = CancellationToken::new();

    // Setup signal handlers
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating shutdown...");
            }
            _ = terminate => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
        }

        cancel_clone.cancel();
    });

    let server = GatewayServer::new(config.gateway_address.clone(), Arc::clone(&dispatcher))
        .with_shutdown_token(cancel.clone());
    let result = server.run().await;

    // Close every remote session, also when the gateway failed to start
    dispatcher.shutdown().await;
    tracing::info!("shellbot shutdown complete");

    result
}
