//! Aggregate reports over the loaded ledger
//!
//! Read-only queries grouping `vendor_orders` by location, day, payment
//! method, and product, plus a one-screen business summary.

mod render;

pub use render::{bar_chart, format_currency, render_summary, write_aggregate_csv};

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use tracing::debug;

/// One group key with its summed `total_amount`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    pub key: String,
    pub total: f64,
}

/// Headline numbers for the whole ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub top_location: Option<String>,
    pub top_product: Option<String>,
}

/// Every report the `report` command produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub locations: Vec<Aggregate>,
    pub daily: Vec<Aggregate>,
    pub payments: Vec<Aggregate>,
    pub products: Vec<Aggregate>,
    pub summary: Summary,
}

/// Named aggregate, as written to `<reports-dir>/<name>.csv`
pub struct ReportTable<'a> {
    pub name: &'static str,
    pub title: &'static str,
    pub key_column: &'static str,
    pub value_column: &'static str,
    pub rows: &'a [Aggregate],
}

impl Report {
    /// The four aggregate tables in display order
    pub fn tables(&self) -> [ReportTable<'_>; 4] {
        [
            ReportTable {
                name: "location_sales",
                title: "Sales by Location",
                key_column: "delivery_location",
                value_column: "total_sales",
                rows: &self.locations,
            },
            ReportTable {
                name: "daily_trends",
                title: "Daily Sales Trend",
                key_column: "order_date",
                value_column: "daily_sales",
                rows: &self.daily,
            },
            ReportTable {
                name: "payment_methods",
                title: "Sales by Payment Method",
                key_column: "payment_method",
                value_column: "total_sales",
                rows: &self.payments,
            },
            ReportTable {
                name: "product_revenue",
                title: "Revenue by Product",
                key_column: "product_name",
                value_column: "total_revenue",
                rows: &self.products,
            },
        ]
    }
}

/// Read-only handle on a loaded ledger
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open an existing ledger; a missing file means the pipeline has not run
    pub fn open(path: &Path) -> Result<Self> {
        debug!(?path, "Ledger::open: called");
        if !path.exists() {
            return Err(eyre::eyre!(
                "Database not found at {}; run the pipeline first",
                path.display()
            ));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .context(format!("Failed to open database {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Number of rows in `vendor_orders`
    pub fn order_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM vendor_orders", [], |row| row.get(0))
            .context("Failed to count orders")?;
        Ok(count)
    }

    /// Sales per delivery location, largest first
    pub fn location_totals(&self) -> Result<Vec<Aggregate>> {
        self.grouped("delivery_location", "group_total DESC, group_key ASC")
    }

    /// Sales per day, oldest first
    pub fn daily_totals(&self) -> Result<Vec<Aggregate>> {
        self.grouped("order_date", "group_key ASC")
    }

    /// Sales per payment method, largest first
    pub fn payment_totals(&self) -> Result<Vec<Aggregate>> {
        self.grouped("payment_method", "group_total DESC, group_key ASC")
    }

    /// Revenue per product, largest first
    pub fn product_totals(&self) -> Result<Vec<Aggregate>> {
        self.grouped("product_name", "group_total DESC, group_key ASC")
    }

    /// Total revenue, order count, and best location and product
    pub fn summary(&self) -> Result<Summary> {
        let total_revenue: Option<f64> = self
            .conn
            .query_row("SELECT SUM(total_amount) FROM vendor_orders", [], |row| row.get(0))
            .context("Failed to sum revenue")?;

        Ok(Summary {
            total_revenue: total_revenue.unwrap_or(0.0),
            total_orders: self.order_count()?,
            top_location: self.top_key("delivery_location")?,
            top_product: self.top_key("product_name")?,
        })
    }

    /// All aggregates and the summary
    pub fn report(&self) -> Result<Report> {
        Ok(Report {
            locations: self.location_totals()?,
            daily: self.daily_totals()?,
            payments: self.payment_totals()?,
            products: self.product_totals()?,
            summary: self.summary()?,
        })
    }

    // Column and ordering come from the fixed set above, never from user input
    fn grouped(&self, column: &str, order_by: &str) -> Result<Vec<Aggregate>> {
        debug!(column, order_by, "Ledger::grouped: called");
        let sql = format!(
            "SELECT {column} AS group_key, SUM(total_amount) AS group_total FROM vendor_orders GROUP BY {column} ORDER BY {order_by}"
        );

        let mut stmt = self.conn.prepare(&sql).context(format!("Failed to query totals by {column}"))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Aggregate {
                    key: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(column, groups = rows.len(), "Ledger::grouped: done");
        Ok(rows)
    }

    fn top_key(&self, column: &str) -> Result<Option<String>> {
        let sql = format!(
            "SELECT {column} FROM vendor_orders GROUP BY {column} ORDER BY SUM(total_amount) DESC, {column} ASC LIMIT 1"
        );
        let key = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .optional()
            .context(format!("Failed to find top {column}"))?;
        Ok(key)
    }
}

/// Write each aggregate table as CSV under `dir`, returning the written paths
pub fn write_tables(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    debug!(?dir, "write_tables: called");
    std::fs::create_dir_all(dir).context(format!("Failed to create reports directory {}", dir.display()))?;

    report
        .tables()
        .iter()
        .map(|table| -> Result<PathBuf> {
            let path = dir.join(format!("{}.csv", table.name));
            write_aggregate_csv(&path, table)?;
            Ok(path)
        })
        .collect()
}
