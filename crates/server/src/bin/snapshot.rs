//! Offline snapshot generator.
//!
//! Usage: `hashistream-snapshot [output-path]`
//!
//! Runs a full scrape (fast pass plus both background passes) and writes the
//! result where the server can hydrate from it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hashistream_core::{
    load_config_or_default, validate_config, HttpFetcher, MovieCache, ScrapeOrchestrator,
    CONFIG_PATH_ENV,
};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.snapshot.path.clone());

    let transport = Arc::new(
        HttpFetcher::new(&config.fetcher).context("Failed to create HTTP client")?,
    );
    let orchestrator =
        ScrapeOrchestrator::from_config(&config, Arc::new(MovieCache::new()), transport);

    info!("Starting full scrape");
    let fast = orchestrator
        .refresh()
        .await
        .context("Initial scrape failed")?;
    info!(records = fast, "Fast pass done, waiting for background passes");

    orchestrator.wait_until_ready().await;

    let bytes = orchestrator
        .write_snapshot(&output)
        .await
        .with_context(|| format!("Failed to write snapshot to {:?}", output))?;

    let count = orchestrator.cache().len().await;
    info!(
        "Saved {} movies to {:?} ({:.1} KB)",
        count,
        output,
        bytes as f64 / 1024.0
    );
    Ok(())
}
