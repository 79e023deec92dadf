//! capsync binary entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use capsync_cli::{Cli, RunConfig, run};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = RunConfig::from_env()?;
    run(&cli, config).await
}
