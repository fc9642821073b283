//! `focusctl`: inspect and edit Focus launcher app policy from a terminal.
//!
//! Usage:
//!   focusctl --store prefs.json --catalog apps.json status
//!   focusctl restrict com.example.game
//!   focusctl unlock com.example.game --minutes 10

use anyhow::Result;
use clap::Parser;
use focus_cli::Cli;
use focus_policy::SystemClock;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut stdout = std::io::stdout();
    focus_cli::run(cli, Arc::new(SystemClock), &mut stdout).await
}
