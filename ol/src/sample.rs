//! Sample vendor order fixtures
//!
//! Generates a reproducible CSV of orders drawn from a small produce catalog,
//! for trying the pipeline and reports without real data.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{Days, NaiveDate};
use eyre::{Context, Result};
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SampleConfig;
use crate::domain::SourceOrder;

/// Product name with its (min, max) unit price
pub const PRODUCTS: &[(&str, f64, f64)] = &[
    ("Maize", 45.0, 55.0),
    ("Potatoes", 30.0, 40.0),
    ("Tomatoes", 80.0, 100.0),
    ("Onions", 60.0, 75.0),
    ("Bananas", 25.0, 35.0),
    ("Cabbage", 40.0, 50.0),
    ("Rice", 110.0, 130.0),
];

pub const LOCATIONS: &[&str] = &[
    "Nairobi CBD",
    "Westlands",
    "Kasarani",
    "Kibera",
    "Eastleigh",
    "Karen",
    "Githurai",
    "Zimmerman",
];

/// Payment method with its relative frequency
pub const PAYMENT_METHODS: &[(&str, f64)] = &[("Soko Loan", 0.3), ("M-PESA", 0.4), ("Cash", 0.2), ("Bank Transfer", 0.1)];

const QUANTITY_RANGE: std::ops::Range<i64> = 5..100;

/// Overview of a generated data set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    pub records: usize,
    pub unique_vendors: usize,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

/// Generate `config.records` orders dated within `config.days` days up to `anchor`.
///
/// The same config and anchor always produce the same rows. Output is sorted
/// by order date, then vendor.
pub fn generate(config: &SampleConfig, anchor: NaiveDate) -> Result<Vec<SourceOrder>> {
    debug!(?config, %anchor, "generate: called");

    if config.vendors == 0 {
        return Err(eyre::eyre!("Sample vendor count must be at least 1"));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    let vendors: Vec<String> = (1..=config.vendors).map(|i| format!("V{:03}", i)).collect();
    let start = anchor
        .checked_sub_days(Days::new(u64::from(config.days)))
        .ok_or_else(|| eyre::eyre!("Sample range of {} days before {} is out of range", config.days, anchor))?;
    let payment_weights =
        WeightedIndex::new(PAYMENT_METHODS.iter().map(|(_, weight)| *weight)).context("Invalid payment weights")?;

    let mut rows = Vec::with_capacity(config.records);
    for _ in 0..config.records {
        let vendor_id = pick(&vendors, &mut rng)?.clone();
        let offset = rng.random_range(0..=u64::from(config.days));
        let order_date = start
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| eyre::eyre!("Sample date offset {} out of range", offset))?
            .format("%Y-%m-%d")
            .to_string();
        let (product, min_price, max_price) = *pick(PRODUCTS, &mut rng)?;
        let quantity = rng.random_range(QUANTITY_RANGE);
        let delivery_location = pick(LOCATIONS, &mut rng)?.to_string();
        let (payment_method, _) = PAYMENT_METHODS[payment_weights.sample(&mut rng)];
        let price = round_cents(rng.random_range(min_price..max_price));

        rows.push(SourceOrder {
            vendor_id,
            order_date,
            product_name: product.to_string(),
            quantity,
            price,
            delivery_location,
            payment_method: payment_method.to_string(),
        });
    }

    rows.sort_by(|a, b| a.order_date.cmp(&b.order_date).then_with(|| a.vendor_id.cmp(&b.vendor_id)));

    info!(count = rows.len(), seed = config.seed, "Generated sample orders");
    Ok(rows)
}

/// Write rows as CSV with a header line, creating parent directories
pub fn write_csv(path: &Path, rows: &[SourceOrder]) -> Result<()> {
    debug!(?path, count = rows.len(), "write_csv: called");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Failed to create directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path).context(format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), "Sample data written");
    Ok(())
}

/// Record count, vendor count, and date range of `rows`
pub fn summarize(rows: &[SourceOrder]) -> SampleSummary {
    let vendors: BTreeSet<&str> = rows.iter().map(|r| r.vendor_id.as_str()).collect();
    let dates: BTreeSet<&str> = rows.iter().map(|r| r.order_date.as_str()).collect();

    SampleSummary {
        records: rows.len(),
        unique_vendors: vendors.len(),
        first_date: dates.first().map(|d| d.to_string()),
        last_date: dates.last().map(|d| d.to_string()),
    }
}

fn pick<'a, T>(items: &'a [T], rng: &mut StdRng) -> Result<&'a T> {
    items.choose(rng).ok_or_else(|| eyre::eyre!("Cannot sample from an empty list"))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
