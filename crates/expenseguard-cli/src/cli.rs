//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use expenseguard_core::MatchMode;

/// ExpenseGuard - Fraud scoring, categorization and spending forecasts
#[derive(Parser)]
#[command(name = "expenseguard")]
#[command(about = "Transaction fraud scoring and spending forecasts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Pipeline config file
    ///
    /// Defaults to ~/.local/share/expenseguard/config/pipeline.toml when it
    /// exists, otherwise the built-in defaults. EXPENSEGUARD_* environment
    /// variables override either.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Model directory holding fraud_model.json and amount_scaler.json
    #[arg(long, global = true)]
    pub models: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (the browser UI)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Allowed CORS origins (comma-separated)
        #[arg(long, value_delimiter = ',')]
        allowed_origins: Vec<String>,
    },

    /// Score a CSV for fraud and categorize every transaction
    Score {
        /// CSV file with V1..V28, Amount and optionally Description
        #[arg(short, long)]
        file: PathBuf,

        /// Print the full JSON report instead of a summary
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Forecast daily spending from a CSV or JSON file
    Forecast {
        /// CSV file, or JSON array of records (by .json extension), with Time and Amount
        #[arg(short, long)]
        file: PathBuf,

        /// Print the forecast as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Write the JSON forecast to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Categorize one or more descriptions
    Categorize {
        /// Descriptions to categorize
        #[arg(required = true)]
        descriptions: Vec<String>,

        /// Keyword match mode: token or phrase (defaults to config)
        #[arg(short, long)]
        mode: Option<MatchMode>,
    },

    /// List the category keyword table
    Keywords {
        /// Keyword match mode: token or phrase (defaults to config)
        #[arg(short, long)]
        mode: Option<MatchMode>,
    },
}
