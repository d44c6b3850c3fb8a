//! Order ledger ETL pipeline
//!
//! Three phases run strictly in sequence, each handing its output to the
//! next by value:
//!
//! - [`extract`] reads the CSV into `Vec<SourceOrder>`
//! - [`transform`] parses dates, derives totals, and normalizes labels
//! - [`load`] replaces the `vendor_orders` table and builds its indexes
//!
//! [`run`] drives the phases and records the [`RunState`] history. The first
//! failing phase stops the run; nothing is retried.

mod extract;
mod load;
mod transform;

pub use extract::extract;
pub use load::load;
pub use transform::{normalize_label, parse_order_date, transform};

pub use load::{dir_writable, store_dir};

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::RunState;
use crate::error::{Phase, PipelineError};

/// Paths a pipeline run reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineContext {
    /// Source CSV
    pub input_path: PathBuf,
    /// SQLite ledger file
    pub store_path: PathBuf,
}

impl PipelineContext {
    pub fn new(input_path: impl Into<PathBuf>, store_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            store_path: store_path.into(),
        }
    }

    /// Context using the paths from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.input_path.clone(), config.store_path.clone())
    }
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new(crate::DEFAULT_INPUT_PATH, crate::DEFAULT_STORE_PATH)
    }
}

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub store_path: PathBuf,
    pub rows: usize,
}

/// Final state of a pipeline run
#[derive(Debug)]
pub struct RunOutcome {
    /// Identifier attached to this run's log lines
    pub run_id: String,
    /// Terminal state
    pub state: RunState,
    /// Every state the run passed through, starting at `NotStarted`
    pub history: Vec<RunState>,
    /// Rows read by extract
    pub rows_read: usize,
    /// Present once load has succeeded
    pub load: Option<LoadSummary>,
    /// The error that stopped the run, if any
    pub error: Option<PipelineError>,
}

impl RunOutcome {
    fn new() -> Self {
        Self {
            run_id: Uuid::now_v7().to_string(),
            state: RunState::NotStarted,
            history: vec![RunState::NotStarted],
            rows_read: 0,
            load: None,
            error: None,
        }
    }

    /// Whether every phase completed
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Loaded
    }

    /// Phase that stopped the run
    pub fn failed_phase(&self) -> Option<Phase> {
        self.state.failed_phase()
    }

    /// 0 on success, otherwise the failing phase's exit code
    pub fn exit_code(&self) -> i32 {
        match self.failed_phase() {
            Some(phase) => phase.exit_code(),
            None if self.succeeded() => 0,
            None => 1,
        }
    }

    fn transition(&mut self, next: RunState) {
        match self.state.advance(next) {
            Some(state) => {
                debug!(run_id = %self.run_id, %state, "RunOutcome::transition: moved");
                self.history.push(state.clone());
                self.state = state;
            }
            None => warn!(run_id = %self.run_id, state = %self.state, "Ignoring illegal state transition"),
        }
    }

    fn fail(mut self, err: PipelineError) -> Self {
        let phase = err.phase();
        error!(run_id = %self.run_id, %phase, error = %err, "Pipeline phase failed");

        if let PipelineError::StoreWrite {
            path,
            dir_exists,
            dir_writable,
            ..
        } = &err
        {
            let cwd = std::env::current_dir().unwrap_or_default();
            error!(
                cwd = %cwd.display(),
                path = %path.display(),
                dir_exists,
                dir_writable,
                "Store diagnostics"
            );
        }

        self.transition(RunState::Failed {
            phase,
            reason: err.to_string(),
        });
        self.error = Some(err);
        self
    }
}

/// Run extract → transform → load against `ctx`
pub fn run(ctx: &PipelineContext) -> RunOutcome {
    let mut outcome = RunOutcome::new();
    info!(
        run_id = %outcome.run_id,
        input = %ctx.input_path.display(),
        store = %ctx.store_path.display(),
        "Starting pipeline"
    );

    outcome.transition(RunState::Extracting);
    let rows = match extract(ctx) {
        Ok(rows) => rows,
        Err(e) => return outcome.fail(e),
    };
    outcome.rows_read = rows.len();

    let records = match transform(rows) {
        Ok(records) => records,
        Err(e) => return outcome.fail(e),
    };
    outcome.transition(RunState::Transformed);

    match load(ctx, &records) {
        Ok(summary) => {
            outcome.load = Some(summary);
            outcome.transition(RunState::Loaded);
        }
        Err(e) => return outcome.fail(e),
    }

    info!(run_id = %outcome.run_id, rows = outcome.rows_read, "Pipeline completed");
    outcome
}
