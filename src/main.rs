//! Player signature decryption gateway.
//!
//! A small authenticated HTTP service that fronts an external
//! player-script analysis engine:
//!
//! ```text
//!   client ──▶ ┌──────────────────────────────────────────────┐
//!              │  GATEWAY                                      │
//!              │  bearer gate → validation → engine handle ────┼──▶ worker pool
//!              │       │                         │             │    (external engine)
//!              │       └──── error taxonomy ◀────┘             │
//!              └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration is merged once at startup: optional TOML file, then
//! `API_BEARER_TOKEN` / `HOST` / `PORT` / `MAX_THREADS` from the
//! environment. Startup fails fast on an invalid merge.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use sig_gateway::config::{self, GatewayConfig};
use sig_gateway::engine::EngineHandle;
use sig_gateway::http::HttpServer;
use sig_gateway::observability;

#[derive(Debug, Parser)]
#[command(name = "sig-gateway", version, about = "Authenticated gateway for player signature decryption")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    config::apply_env_overrides(&mut config)?;

    observability::logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sig-gateway starting");

    if let Err(errors) = config::validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "invalid configuration");
        }
        return Err("configuration validation failed".into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        engine_command = %config.engine.command,
        engine_workers = config.engine.effective_workers(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The engine lives exactly as long as the process. A failed spawn is
    // not fatal here: the gateway still comes up and answers 503 so
    // operators see the condition instead of a crash loop.
    let engine = Arc::new(EngineHandle::spawn(&config.engine));

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        engine_available = engine.is_available(),
        "Listening for connections"
    );

    let server = HttpServer::new(config, engine);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
