//! Secure static-asset delivery service.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────────────┐
//!                      │                 SECURE UPLOADS SERVICE                │
//!                      │                                                       │
//!   GET /uploads/...   │  ┌─────────┐   ┌────────────┐   ┌───────────────────┐ │
//!   ───────────────────┼─▶│  http   │──▶│  delivery  │──▶│     security      │ │
//!                      │  │ server  │   │  handler   │   │ normalize/scan    │ │
//!                      │  └─────────┘   └─────┬──────┘   │ dotfile/sandbox   │ │
//!                      │                      │          └─────────┬─────────┘ │
//!                      │                      ▼                    │           │
//!   200 bytes / JSON   │  ┌─────────┐   ┌────────────┐             │           │
//!   ◀──────────────────┼──│response │◀──│  headers   │◀────────────┘           │
//!                      │  └─────────┘   └────────────┘                         │
//!                      │                                                       │
//!                      │  config · observability · lifecycle · net (TLS)       │
//!                      └───────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use secure_uploads::config::{load_config, ServiceConfig};
use secure_uploads::lifecycle::{build_server, signals, Shutdown, StartupError};
use secure_uploads::net::tls::load_tls_config;
use secure_uploads::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "secure-uploads", version, about = "Secure static-asset delivery service")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve (overrides STATIC_ROOT).
    #[arg(long)]
    static_root: Option<String>,

    /// Bind address (overrides BIND_ADDRESS).
    #[arg(short, long)]
    bind: Option<String>,

    /// Mount prefix for assets.
    #[arg(long)]
    mount_prefix: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut ServiceConfig) {
        if let Some(root) = &self.static_root {
            config.assets.static_root = root.clone();
        }
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(prefix) = &self.mount_prefix {
            config.assets.mount_prefix = prefix.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), |c| cli.apply(c))?;

    logging::init_logging(&config.observability)?;
    tracing::info!("secure-uploads v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    let bind_address = config.listener.bind_address.clone();
    let tls = config.listener.tls.clone();
    let server = build_server(config)?;

    match tls {
        Some(tls) => {
            let rustls = load_tls_config(&tls).await.map_err(StartupError::Tls)?;
            let addr = bind_address.parse()?;
            server.run_tls(addr, rustls, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&bind_address)
                .await
                .map_err(|source| StartupError::Bind {
                    address: bind_address.clone(),
                    source,
                })?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
