//! Load phase: replace the ledger table inside one transaction

use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::{AccessFlags, access};
use rusqlite::{Connection, TransactionBehavior, params};
use tracing::{debug, info};

use super::{LoadSummary, PipelineContext};
use crate::TABLE_NAME;
use crate::domain::OrderRecord;
use crate::error::{PipelineError, StoreFault};

const CREATE_TABLE_SQL: &str = "
    DROP TABLE IF EXISTS vendor_orders;
    CREATE TABLE vendor_orders (
        vendor_id TEXT NOT NULL,
        order_date TEXT NOT NULL,
        product_name TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        price REAL NOT NULL,
        delivery_location TEXT NOT NULL,
        payment_method TEXT NOT NULL,
        total_amount REAL NOT NULL
    );
";

const INSERT_SQL: &str = "
    INSERT INTO vendor_orders (
        vendor_id, order_date, product_name, quantity, price,
        delivery_location, payment_method, total_amount
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
";

const CREATE_INDEXES_SQL: &str = "
    CREATE INDEX idx_vendor_id ON vendor_orders(vendor_id);
    CREATE INDEX idx_order_date ON vendor_orders(order_date);
";

/// Write `records` to the ledger, replacing whatever table was there.
///
/// Drop, create, insert, and index creation share one transaction, so a
/// failure at any step leaves the previous table untouched. The connection
/// is released on every path.
pub fn load(ctx: &PipelineContext, records: &[OrderRecord]) -> Result<LoadSummary, PipelineError> {
    let path = &ctx.store_path;
    debug!(?path, count = records.len(), "load: called");

    let dir = store_dir(path);
    fs::create_dir_all(&dir).map_err(|e| store_error(path, e))?;

    info!(path = %path.display(), "Opening store");
    let mut conn = Connection::open(path).map_err(|e| store_error(path, e))?;

    let rows = match replace_table(&mut conn, records) {
        Ok(rows) => rows,
        Err(e) => {
            debug!("load: write failed, dropping connection");
            drop(conn);
            return Err(store_error(path, e));
        }
    };

    conn.close().map_err(|(_, e)| store_error(path, e))?;
    info!(rows, table = TABLE_NAME, "Data loaded and indexes created");

    Ok(LoadSummary {
        store_path: path.clone(),
        rows,
    })
}

fn replace_table(conn: &mut Connection, records: &[OrderRecord]) -> rusqlite::Result<usize> {
    debug!(count = records.len(), "replace_table: called");
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    tx.execute_batch(CREATE_TABLE_SQL)?;

    {
        let mut stmt = tx.prepare(INSERT_SQL)?;
        for record in records {
            stmt.execute(params![
                record.vendor_id,
                record.order_date_text(),
                record.product_name,
                record.quantity,
                record.price,
                record.delivery_location,
                record.payment_method,
                record.total_amount,
            ])?;
        }
    }
    debug!("replace_table: rows inserted");

    tx.execute_batch(CREATE_INDEXES_SQL)?;
    tx.commit()?;

    Ok(records.len())
}

/// Directory holding the store file
pub fn store_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether the current process may create files in `dir`
pub fn dir_writable(dir: &Path) -> bool {
    dir.is_dir() && access(dir, AccessFlags::W_OK | AccessFlags::X_OK).is_ok()
}

fn store_error(path: &Path, source: impl Into<StoreFault>) -> PipelineError {
    let dir = store_dir(path);
    PipelineError::StoreWrite {
        path: path.to_path_buf(),
        dir_exists: dir.is_dir(),
        dir_writable: dir_writable(&dir),
        source: source.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(vendor_id: &str, location: &str, quantity: i64, price: f64) -> OrderRecord {
        OrderRecord {
            vendor_id: vendor_id.to_string(),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            product_name: "Maize".to_string(),
            quantity,
            price,
            delivery_location: location.to_string(),
            payment_method: "CASH".to_string(),
            total_amount: quantity as f64 * price,
        }
    }

    fn context(temp: &TempDir) -> PipelineContext {
        PipelineContext::new(temp.path().join("vendor_orders.csv"), temp.path().join("db").join("orders.db"))
    }

    fn count_rows(path: &Path) -> i64 {
        let conn = Connection::open(path).unwrap();
        conn.query_row("SELECT COUNT(*) FROM vendor_orders", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_load_creates_table_and_indexes() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);

        let summary = load(&ctx, &[record("V001", "KAREN", 10, 50.0), record("V002", "KIBERA", 2, 3.5)]).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(count_rows(&ctx.store_path), 2);

        let conn = Connection::open(&ctx.store_path).unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'vendor_orders' ORDER BY name")
            .unwrap();
        let indexes: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(indexes, vec!["idx_order_date", "idx_vendor_id"]);
    }

    #[test]
    fn test_load_replaces_previous_contents() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);

        load(&ctx, &[record("V001", "KAREN", 1, 1.0), record("V002", "KAREN", 1, 1.0)]).unwrap();
        load(&ctx, &[record("V003", "KAREN", 1, 1.0)]).unwrap();

        assert_eq!(count_rows(&ctx.store_path), 1);
    }

    #[test]
    fn test_failed_load_keeps_previous_table() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        load(&ctx, &[record("V001", "KAREN", 1, 1.0), record("V002", "KAREN", 1, 1.0)]).unwrap();

        // An index name held by another table makes index creation fail after the insert
        {
            let conn = Connection::open(&ctx.store_path).unwrap();
            conn.execute_batch(
                "DROP INDEX idx_order_date;
                 CREATE TABLE other (x TEXT);
                 CREATE INDEX idx_order_date ON other(x);",
            )
            .unwrap();
        }

        let err = load(&ctx, &[record("V009", "KAREN", 1, 1.0)]).unwrap_err();
        match err {
            PipelineError::StoreWrite { dir_exists, dir_writable, .. } => {
                assert!(dir_exists);
                assert!(dir_writable);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(count_rows(&ctx.store_path), 2);
    }

    #[test]
    fn test_store_error_on_unopenable_path() {
        let temp = TempDir::new().unwrap();
        // A directory where the store file should be
        let store_path = temp.path().join("db");
        fs::create_dir_all(&store_path).unwrap();
        let ctx = PipelineContext::new(temp.path().join("vendor_orders.csv"), store_path);

        let err = load(&ctx, &[record("V001", "KAREN", 1, 1.0)]).unwrap_err();
        assert!(matches!(err, PipelineError::StoreWrite { .. }));
    }

    #[test]
    fn test_store_dir_under_regular_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blocker"), "not a directory").unwrap();
        let ctx = PipelineContext::new(
            temp.path().join("vendor_orders.csv"),
            temp.path().join("blocker").join("db").join("orders.db"),
        );

        match load(&ctx, &[record("V001", "KAREN", 1, 1.0)]).unwrap_err() {
            PipelineError::StoreWrite {
                path,
                dir_exists,
                dir_writable,
                source,
            } => {
                assert_eq!(path, ctx.store_path);
                assert!(!dir_exists);
                assert!(!dir_writable);
                assert!(matches!(source, StoreFault::Io(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dir_writable_matches_actual_access() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("locked");
        fs::create_dir(&dir).unwrap();
        assert!(dir_writable(&dir));

        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();
        // Privileged users may still write, so compare against a real write
        let can_write = fs::write(dir.join("scratch"), "x").is_ok();
        assert_eq!(dir_writable(&dir), can_write);

        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(!dir_writable(&temp.path().join("absent")));
    }

    #[test]
    fn test_store_dir_for_bare_file_name() {
        assert_eq!(store_dir(Path::new("orders.db")), PathBuf::from("."));
        assert_eq!(store_dir(Path::new("db/orders.db")), PathBuf::from("db"));
    }
}
