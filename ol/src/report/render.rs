//! Report output: CSV tables, terminal bar charts, summary block

use std::path::Path;

use eyre::{Context, Result};
use tracing::debug;

use super::{ReportTable, Summary};

const BAR_CHAR: char = '█';
const RULE_WIDTH: usize = 50;

/// Write one aggregate table as a two-column CSV (totals to 2 decimals)
pub fn write_aggregate_csv(path: &Path, table: &ReportTable<'_>) -> Result<()> {
    debug!(?path, rows = table.rows.len(), "write_aggregate_csv: called");
    let mut writer = csv::Writer::from_path(path).context(format!("Failed to create {}", path.display()))?;

    writer.write_record([table.key_column, table.value_column])?;
    for row in table.rows {
        writer.write_record([row.key.as_str(), format!("{:.2}", row.total).as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Horizontal bar chart; the largest total fills `width` cells
pub fn bar_chart(table: &ReportTable<'_>, width: usize) -> String {
    let mut out = format!("{}\n", table.title);
    if table.rows.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }

    let label_width = table.rows.iter().map(|r| r.key.chars().count()).max().unwrap_or(0);
    let max_total = table.rows.iter().map(|r| r.total).fold(0.0_f64, f64::max);

    for row in table.rows {
        let cells = if max_total > 0.0 {
            ((row.total / max_total) * width as f64).round() as usize
        } else {
            0
        };
        let bar: String = std::iter::repeat_n(BAR_CHAR, cells).collect();
        out.push_str(&format!(
            "  {:<label_width$} {:<width$} {}\n",
            row.key,
            bar,
            format_currency(row.total)
        ));
    }
    out
}

/// `$` amount with thousands separators and 2 decimals
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

/// Boxed business summary
pub fn render_summary(summary: &Summary) -> String {
    let rule = "*".repeat(RULE_WIDTH);
    let none = "n/a".to_string();
    let lines = [
        ("Total Revenue", format_currency(summary.total_revenue)),
        ("Total Orders", summary.total_orders.to_string()),
        ("Top Location", summary.top_location.clone().unwrap_or_else(|| none.clone())),
        ("Top Product", summary.top_product.clone().unwrap_or(none)),
    ];

    let mut out = format!("{rule}\nBUSINESS SUMMARY\n{rule}\n");
    for (metric, value) in lines {
        out.push_str(&format!("{:<15}: {}\n", metric, value));
    }
    out.push_str(&rule);
    out.push('\n');
    out
}
