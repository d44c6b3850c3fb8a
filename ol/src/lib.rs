//! OrderLedger - vendor order ETL and reporting
//!
//! Loads a CSV export of vendor orders into a local SQLite ledger and builds
//! aggregate reports on top of it.
//!
//! # Architecture
//!
//! ```text
//! data/vendor_orders.csv
//!        │ extract     (csv → Vec<SourceOrder>)
//!        ▼
//!   transform          (dates, totals, normalized labels → Vec<OrderRecord>)
//!        │ load        (one transaction: drop, create, insert, index)
//!        ▼
//! db/twiga_orders.db   ── report ──▶ reports/*.csv + summary
//! ```
//!
//! # Example
//!
//! ```ignore
//! use orderledger::pipeline::{self, PipelineContext};
//!
//! let ctx = PipelineContext::default();
//! let outcome = pipeline::run(&ctx);
//! std::process::exit(outcome.exit_code());
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod sample;

pub use config::{Config, SampleConfig};
pub use domain::{OrderRecord, RunState, SourceOrder};
pub use error::{Phase, PipelineError};
pub use pipeline::{LoadSummary, PipelineContext, RunOutcome};

/// Conventional location of the source CSV, relative to the working directory
pub const DEFAULT_INPUT_PATH: &str = "data/vendor_orders.csv";

/// Conventional location of the SQLite ledger, relative to the working directory
pub const DEFAULT_STORE_PATH: &str = "db/twiga_orders.db";

/// Conventional directory for report output
pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Destination table inside the ledger
pub const TABLE_NAME: &str = "vendor_orders";
