//! ExpenseGuard CLI - Fraud scoring and spending forecasts
//!
//! Usage:
//!   expenseguard serve --port 5000          Start web server
//!   expenseguard score --file tx.csv        Score and categorize a CSV
//!   expenseguard forecast --file tx.csv     Forecast daily spending
//!   expenseguard categorize "SHELL OIL"     Categorize descriptions

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.models.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            allowed_origins,
        } => {
            commands::cmd_serve(config, &host, port, static_dir.as_deref(), allowed_origins)
                .await
        }
        Commands::Score { file, json, output } => {
            commands::cmd_score(&config, &file, json, output.as_deref())
        }
        Commands::Forecast { file, json, output } => {
            commands::cmd_forecast(&config, &file, json, output.as_deref())
        }
        Commands::Categorize { descriptions, mode } => {
            commands::cmd_categorize(&config, mode, &descriptions)
        }
        Commands::Keywords { mode } => commands::cmd_keywords(&config, mode),
    }
}
