//! Store connectivity probe
//!
//! Checks that a SQLite database can be created in the store directory before
//! running the pipeline against it.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, warn};

use crate::pipeline::dir_writable;

const PROBE_FILE: &str = ".orderledger-probe.db";

/// What the probe found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub cwd: PathBuf,
    pub dir: PathBuf,
    pub dir_exists: bool,
    pub dir_writable: bool,
    /// `None` when a scratch database was created and removed
    pub error: Option<String>,
}

impl ProbeReport {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Try to create (and then remove) a scratch database in `dir`
pub fn check(dir: &Path) -> ProbeReport {
    debug!(?dir, "check: called");
    let dir_exists = dir.is_dir();

    let mut report = ProbeReport {
        cwd: std::env::current_dir().unwrap_or_default(),
        dir: dir.to_path_buf(),
        dir_exists,
        dir_writable: dir_writable(dir),
        error: None,
    };

    if !dir_exists {
        report.error = Some(format!("Directory {} does not exist", dir.display()));
        return report;
    }

    let scratch = dir.join(PROBE_FILE);
    if let Err(e) = create_scratch(&scratch) {
        warn!(path = %scratch.display(), error = %e, "Probe database could not be created");
        report.error = Some(e.to_string());
    }

    if scratch.exists()
        && let Err(e) = fs::remove_file(&scratch)
    {
        warn!(path = %scratch.display(), error = %e, "Failed to remove probe database");
    }

    report
}

fn create_scratch(path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch("CREATE TABLE probe (id INTEGER); DROP TABLE probe;")?;
    conn.close().map_err(|(_, e)| e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_probe_writable_dir() {
        let temp = TempDir::new().unwrap();

        let report = check(temp.path());
        assert!(report.ok(), "probe failed: {:?}", report.error);
        assert!(report.dir_exists);
        assert!(report.dir_writable);
        assert!(!temp.path().join(PROBE_FILE).exists());
    }

    #[test]
    fn test_probe_read_only_mode_agrees_with_outcome() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("locked");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

        let report = check(&dir);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(report.dir_exists);
        assert_eq!(report.dir_writable, report.ok(), "report: {report:?}");
    }

    #[test]
    fn test_probe_missing_dir() {
        let temp = TempDir::new().unwrap();

        let report = check(&temp.path().join("nope"));
        assert!(!report.ok());
        assert!(!report.dir_exists);
        assert!(!report.dir_writable);
    }
}
