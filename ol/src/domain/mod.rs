//! Domain types for OrderLedger
//!
//! Core domain types: SourceOrder (a parsed CSV row), OrderRecord (a
//! transformed ledger row), and RunState (the pipeline state machine).

mod order;
mod state;

pub use order::{OrderRecord, SourceOrder};
pub use state::RunState;
