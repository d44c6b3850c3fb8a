//! CLI argument parsing for orderledger

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ol")]
#[command(author, version, about = "Load vendor orders into a SQLite ledger and report on them", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract the CSV, transform it, and load it into the ledger
    Run {
        /// Source CSV (default: data/vendor_orders.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// SQLite ledger file (default: db/twiga_orders.db)
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Write a reproducible sample CSV
    Generate {
        /// Number of orders
        #[arg(short = 'n', long)]
        records: Option<usize>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Last order date, YYYY-MM-DD (default: today)
        #[arg(long)]
        anchor: Option<NaiveDate>,

        /// Output CSV (default: the configured input path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Aggregate the ledger into report tables and a summary
    Report {
        /// SQLite ledger file (default: db/twiga_orders.db)
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Directory for report CSVs (default: reports)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Check that a SQLite database can be created in the store directory
    Probe {
        /// Directory to check (default: the store's directory)
        dir: Option<PathBuf>,
    },
}

/// Output format for report results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
