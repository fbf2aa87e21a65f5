//! Campaign research daemon
//!
//! Serves `POST /api/research`, forwarding each brief to the completion
//! service and returning the recovered research result.

use anyhow::{Context, Result};
use campaign_common::AnthropicClient;
use campaignd::config::Config;
use campaignd::server::{self, AppState};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Campaign research gateway daemon
#[derive(Parser)]
#[command(name = "campaignd")]
#[command(about = "Campaign research gateway over a hosted completion service", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to /etc/campaignd/config.toml when present)
    #[arg(long, env = "CAMPAIGND_CONFIG")]
    config: Option<PathBuf>,

    /// Listening port (overrides config file and $PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap and config overrides both see it
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("[BOOT] campaignd v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    info!("[BOOT] Config loaded");

    if !config.has_api_key() {
        warn!("[BOOT] ANTHROPIC_API_KEY is not set; research requests will fail until it is");
    }

    let client =
        AnthropicClient::new(config.llm.clone()).context("Failed to create completion client")?;
    let state = AppState::new(Arc::new(client), &config);

    server::run(state, &config.server).await
}
