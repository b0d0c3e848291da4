//! MIA CLI - Medical Imaging Assistant
//!
//! Log in, manage patients, images and reports, and run image analysis
//! against the MIA service.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod events;
mod output;

use commands::Cli;

/// Initialize tracing on stderr, plus an append-only log file when asked.
fn init_tracing(log_file: Option<&std::path::Path>, verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "mia=debug,mia_client=debug,mia_analysis=debug,mia_store=debug"
    } else {
        "mia=info,mia_client=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref(), cli.verbose)?;
    cli.execute().await
}
