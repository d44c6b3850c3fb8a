//! Pipeline error types

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three sequential pipeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Extract,
    Transform,
    Load,
}

impl Phase {
    /// Process exit code reported when this phase fails
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Extract => 2,
            Self::Transform => 3,
            Self::Load => 4,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extract => write!(f, "extract"),
            Self::Transform => write!(f, "transform"),
            Self::Load => write!(f, "load"),
        }
    }
}

/// Errors raised by the extract, transform, and load phases
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid {column} '{value}' on row {row}: {reason}")]
    DataFormat {
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error(
        "Failed to write store {} (directory exists: {dir_exists}, directory writable: {dir_writable}): {source}",
        path.display()
    )]
    StoreWrite {
        path: PathBuf,
        dir_exists: bool,
        dir_writable: bool,
        #[source]
        source: StoreFault,
    },
}

/// Underlying cause of a store write failure
#[derive(Debug, Error)]
pub enum StoreFault {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// The phase this error belongs to
    pub fn phase(&self) -> Phase {
        match self {
            Self::MissingInput { .. } | Self::Parse { .. } => Phase::Extract,
            Self::DataFormat { .. } => Phase::Transform,
            Self::StoreWrite { .. } => Phase::Load,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_message() {
        let err = PipelineError::MissingInput {
            path: PathBuf::from("data/vendor_orders.csv"),
        };

        let msg = err.to_string();
        assert!(msg.contains("data/vendor_orders.csv"));
        assert_eq!(err.phase(), Phase::Extract);
    }

    #[test]
    fn test_data_format_message() {
        let err = PipelineError::DataFormat {
            row: 7,
            column: "order_date",
            value: "not-a-date".to_string(),
            reason: "unrecognized date".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("order_date"));
        assert!(msg.contains("not-a-date"));
        assert!(msg.contains("row 7"));
        assert_eq!(err.phase(), Phase::Transform);
    }

    #[test]
    fn test_store_write_carries_diagnostics() {
        let err = PipelineError::StoreWrite {
            path: PathBuf::from("/readonly/db/twiga_orders.db"),
            dir_exists: true,
            dir_writable: false,
            source: rusqlite::Error::InvalidQuery.into(),
        };

        let msg = err.to_string();
        assert!(msg.contains("/readonly/db/twiga_orders.db"));
        assert!(msg.contains("directory exists: true"));
        assert!(msg.contains("directory writable: false"));
        assert_eq!(err.phase(), Phase::Load);
    }

    #[test]
    fn test_store_write_from_io_fault() {
        let err = PipelineError::StoreWrite {
            path: PathBuf::from("blocker/db/twiga_orders.db"),
            dir_exists: false,
            dir_writable: false,
            source: std::io::Error::from(std::io::ErrorKind::NotADirectory).into(),
        };

        assert!(matches!(
            err,
            PipelineError::StoreWrite {
                source: StoreFault::Io(_),
                ..
            }
        ));
        assert!(err.to_string().contains("directory exists: false"));
        assert_eq!(err.phase(), Phase::Load);
    }

    #[test]
    fn test_phase_exit_codes_are_distinct() {
        let codes = [Phase::Extract, Phase::Transform, Phase::Load].map(Phase::exit_code);
        assert_eq!(codes, [2, 3, 4]);
        assert_eq!(Phase::Transform.to_string(), "transform");
    }
}
