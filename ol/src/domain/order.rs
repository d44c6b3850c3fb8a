//! Order rows before and after transformation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the source CSV as extracted.
///
/// Columns are matched by header name; `order_date` stays raw text until the
/// transform phase parses it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceOrder {
    pub vendor_id: String,
    pub order_date: String,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
    pub delivery_location: String,
    pub payment_method: String,
}

/// One normalized row of the `vendor_orders` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub vendor_id: String,
    pub order_date: NaiveDate,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
    /// Trimmed, upper-cased
    pub delivery_location: String,
    /// Trimmed, upper-cased
    pub payment_method: String,
    /// `quantity * price`
    pub total_amount: f64,
}

impl OrderRecord {
    /// Date as stored in the ledger (`YYYY-MM-DD`)
    pub fn order_date_text(&self) -> String {
        self.order_date.format("%Y-%m-%d").to_string()
    }
}
