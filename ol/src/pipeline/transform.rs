//! Transform phase: parse dates, derive totals, normalize labels

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::domain::{OrderRecord, SourceOrder};
use crate::error::PipelineError;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Turn extracted rows into ledger rows.
///
/// Every row gets the same treatment: date parsing, `total_amount`
/// derivation, then label normalization. The first bad row fails the phase.
pub fn transform(rows: Vec<SourceOrder>) -> Result<Vec<OrderRecord>, PipelineError> {
    debug!(count = rows.len(), "transform: called");

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| transform_row(idx + 1, row))
        .collect::<Result<Vec<_>, _>>()?;

    info!(count = records.len(), "Data transformation completed");
    Ok(records)
}

fn transform_row(row_num: usize, row: SourceOrder) -> Result<OrderRecord, PipelineError> {
    let order_date = parse_order_date(&row.order_date).ok_or_else(|| PipelineError::DataFormat {
        row: row_num,
        column: "order_date",
        value: row.order_date.clone(),
        reason: "not a recognizable date".to_string(),
    })?;

    if row.quantity <= 0 {
        return Err(PipelineError::DataFormat {
            row: row_num,
            column: "quantity",
            value: row.quantity.to_string(),
            reason: "must be a positive integer".to_string(),
        });
    }

    if !row.price.is_finite() || row.price <= 0.0 {
        return Err(PipelineError::DataFormat {
            row: row_num,
            column: "price",
            value: row.price.to_string(),
            reason: "must be a positive amount".to_string(),
        });
    }

    let total_amount = row.quantity as f64 * row.price;

    Ok(OrderRecord {
        vendor_id: row.vendor_id,
        order_date,
        product_name: row.product_name,
        quantity: row.quantity,
        price: row.price,
        delivery_location: checked_label(row_num, "delivery_location", &row.delivery_location)?,
        payment_method: checked_label(row_num, "payment_method", &row.payment_method)?,
        total_amount,
    })
}

// Some lower-case letters (`ª`, `ʰ`) have no upper-case form and survive normalization
fn checked_label(row_num: usize, column: &'static str, value: &str) -> Result<String, PipelineError> {
    let label = normalize_label(value);
    if label.chars().any(char::is_lowercase) {
        return Err(PipelineError::DataFormat {
            row: row_num,
            column,
            value: value.to_string(),
            reason: "contains lower-case characters with no upper-case form".to_string(),
        });
    }
    Ok(label)
}

/// Parse a calendar date, discarding any time-of-day component
pub fn parse_order_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive())
}

/// Upper-case and trim surrounding whitespace
pub fn normalize_label(value: &str) -> String {
    value.to_uppercase().trim().to_string()
}
