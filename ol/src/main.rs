//! OrderLedger - vendor order ETL and reporting
//!
//! CLI entry point. Exit status: 0 on success, 2/3/4 when the extract,
//! transform, or load phase fails, 1 for any other error.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use orderledger::cli::{Cli, Command, OutputFormat};
use orderledger::config::Config;
use orderledger::pipeline::{self, PipelineContext};
use orderledger::report::{self, Ledger};
use orderledger::{probe, sample};

const CHART_WIDTH: usize = 40;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("{}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:?}", "✗".red(), e);
            1
        }
    };

    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let config_path = Config::locate(cli.config.as_ref());
    let config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    match &config_path {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }
    info!("orderledger starting");

    debug!(command = ?cli.command, "run: dispatching command");
    match cli.command.unwrap_or(Command::Run {
        input: None,
        store: None,
    }) {
        Command::Run { input, store } => cmd_run(&config, input, store),
        Command::Generate {
            records,
            seed,
            anchor,
            output,
        } => cmd_generate(&config, records, seed, anchor, output),
        Command::Report {
            store,
            output_dir,
            format,
        } => cmd_report(&config, store, output_dir, format),
        Command::Probe { dir } => cmd_probe(&config, dir),
    }
}

fn cmd_run(config: &Config, input: Option<PathBuf>, store: Option<PathBuf>) -> Result<i32> {
    let mut ctx = PipelineContext::from_config(config);
    if let Some(input) = input {
        ctx.input_path = input;
    }
    if let Some(store) = store {
        ctx.store_path = store;
    }

    println!("{}", "=== Starting ETL Pipeline ===".bold());
    println!("Input file: {}", ctx.input_path.display());
    println!("Database file: {}", ctx.store_path.display());

    let outcome = pipeline::run(&ctx);

    match (&outcome.load, outcome.failed_phase()) {
        (Some(summary), _) => {
            println!("{} Read {} records from CSV", "✓".green(), outcome.rows_read);
            println!(
                "{} Loaded {} rows into {}",
                "✓".green(),
                summary.rows,
                summary.store_path.display().to_string().cyan()
            );
            println!("{}", "=== ETL Pipeline completed successfully ===".bold());
        }
        (None, Some(phase)) => {
            if let Some(err) = &outcome.error {
                println!("{} {} phase failed: {}", "✗".red(), phase, err);
            }
            println!("Pipeline failed. Fix the problem above and re-run.");
        }
        (None, None) => println!("{} Pipeline stopped in state: {}", "✗".red(), outcome.state),
    }

    Ok(outcome.exit_code())
}

fn cmd_generate(
    config: &Config,
    records: Option<usize>,
    seed: Option<u64>,
    anchor: Option<NaiveDate>,
    output: Option<PathBuf>,
) -> Result<i32> {
    let mut sample_config = config.sample.clone();
    if let Some(records) = records {
        sample_config.records = records;
    }
    if let Some(seed) = seed {
        sample_config.seed = seed;
    }
    let anchor = anchor.unwrap_or_else(|| Local::now().date_naive());
    let output = output.unwrap_or_else(|| config.input_path.clone());

    let rows = sample::generate(&sample_config, anchor)?;
    sample::write_csv(&output, &rows)?;

    let summary = sample::summarize(&rows);
    println!(
        "{} Sample data written to {}",
        "✓".green(),
        output.display().to_string().cyan()
    );
    println!("  Total records: {}", summary.records);
    println!("  Unique vendors: {}", summary.unique_vendors);
    if let (Some(first), Some(last)) = (&summary.first_date, &summary.last_date) {
        println!("  Date range: {} to {}", first, last);
    }

    Ok(0)
}

fn cmd_report(
    config: &Config,
    store: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<i32> {
    let store = store.unwrap_or_else(|| config.store_path.clone());
    let output_dir = output_dir.unwrap_or_else(|| config.reports_dir.clone());

    let ledger = Ledger::open(&store)?;
    let report = ledger.report()?;
    let written = report::write_tables(&report, &output_dir)?;
    info!(count = written.len(), dir = %output_dir.display(), "Report tables written");

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!("Found {} records in database", report.summary.total_orders);
            for table in report.tables() {
                println!();
                print!("{}", report::bar_chart(&table, CHART_WIDTH));
            }
            println!();
            print!("{}", report::render_summary(&report.summary));
            println!(
                "{} Report tables saved to {}",
                "✓".green(),
                output_dir.display().to_string().cyan()
            );
        }
    }

    Ok(0)
}

fn cmd_probe(config: &Config, dir: Option<PathBuf>) -> Result<i32> {
    let dir = dir.unwrap_or_else(|| pipeline::store_dir(&config.store_path));
    let report = probe::check(&dir);

    println!("Current directory: {}", report.cwd.display());
    println!("Directory: {}", report.dir.display());
    println!("  Exists: {}", report.dir_exists);
    println!("  Writable: {}", report.dir_writable);

    if report.ok() {
        println!("{} Successfully created test database", "✓".green());
        return Ok(0);
    }

    if let Some(err) = &report.error {
        println!("{} Could not create test database: {}", "✗".red(), err);
    }
    Ok(1)
}
