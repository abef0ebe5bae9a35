//! Purchase ledger loading and per-customer profile aggregation using Polars

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;

use crate::error::AnalyticsError;

/// One validated purchase event. Source of truth; never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseEvent {
    pub customer_id: String,
    pub product_id: String,
    pub category: String,
    /// Purchase amount, non-negative.
    pub amount: f64,
    pub date: NaiveDate,
}

/// Behavioral profile derived from all events of one customer, relative to
/// a fixed analysis reference date. Recomputed fully on each run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub total_spend: f64,
    /// Number of purchase events; at least 1 for any profile that exists.
    pub purchase_count: usize,
    pub average_order_value: f64,
    /// Days between the reference date and the most recent purchase.
    pub recency_days: i64,
}

/// Load the purchase ledger from a CSV file.
///
/// Expected schema (one row per purchase event):
/// `Customer ID, Product ID, Product Category, Purchase Amount, Purchase Date`
///
/// Rows with missing fields, non-numeric or negative amounts, or unparseable
/// dates abort the load with `DataFormat`. A file with zero data rows is
/// `InsufficientData`.
pub fn load_events(path: &str) -> crate::Result<Vec<PurchaseEvent>> {
    let df = CsvReader::from_path(path)
        .map_err(|e| AnalyticsError::DataFormat(format!("cannot open {path}: {e}")))?
        .has_header(true)
        .finish()
        .map_err(|e| AnalyticsError::DataFormat(format!("cannot parse {path}: {e}")))?;

    if df.height() == 0 {
        return Err(AnalyticsError::InsufficientData(format!(
            "no purchase records in {path}"
        )));
    }

    let customers = text_column(&df, "Customer ID")?;
    let products = text_column(&df, "Product ID")?;
    let categories = text_column(&df, "Product Category")?;
    let amounts = numeric_column(&df, "Purchase Amount")?;
    let dates = text_column(&df, "Purchase Date")?;

    let customers = string_values(&customers)?;
    let products = string_values(&products)?;
    let categories = string_values(&categories)?;
    let amounts = amounts
        .f64()
        .map_err(|e| AnalyticsError::DataFormat(e.to_string()))?;
    let dates = string_values(&dates)?;

    let mut events = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let customer_id = required(&customers, row, "Customer ID")?;
        let product_id = required(&products, row, "Product ID")?;
        let category = required(&categories, row, "Product Category")?;
        let date_str = required(&dates, row, "Purchase Date")?;

        let amount = amounts.get(row).ok_or_else(|| {
            AnalyticsError::DataFormat(format!(
                "row {}: missing or non-numeric 'Purchase Amount'",
                row + 1
            ))
        })?;
        if amount < 0.0 {
            return Err(AnalyticsError::DataFormat(format!(
                "row {}: negative purchase amount {amount}",
                row + 1
            )));
        }

        let date = parse_date(date_str).ok_or_else(|| {
            AnalyticsError::DataFormat(format!(
                "row {}: unparseable 'Purchase Date' value '{date_str}'",
                row + 1
            ))
        })?;

        events.push(PurchaseEvent {
            customer_id: customer_id.to_string(),
            product_id: product_id.to_string(),
            category: category.to_string(),
            amount,
            date,
        });
    }

    Ok(events)
}

/// Reduce purchase events into one profile per distinct customer.
///
/// Recency is measured against `reference_date`; customers with zero events
/// simply have no profile. Returns a sorted map so downstream iteration is
/// deterministic.
pub fn build_profiles(
    events: &[PurchaseEvent],
    reference_date: NaiveDate,
) -> BTreeMap<String, CustomerProfile> {
    let mut rollup: BTreeMap<&str, (f64, usize, NaiveDate)> = BTreeMap::new();
    for event in events {
        let entry = rollup
            .entry(event.customer_id.as_str())
            .or_insert((0.0, 0, event.date));
        entry.0 += event.amount;
        entry.1 += 1;
        if event.date > entry.2 {
            entry.2 = event.date;
        }
    }

    rollup
        .into_iter()
        .map(|(customer_id, (total_spend, purchase_count, last_purchase))| {
            let profile = CustomerProfile {
                customer_id: customer_id.to_string(),
                total_spend,
                purchase_count,
                average_order_value: total_spend / purchase_count as f64,
                recency_days: reference_date.signed_duration_since(last_purchase).num_days(),
            };
            (customer_id.to_string(), profile)
        })
        .collect()
}

/// Most recent purchase date across the whole ledger, if any.
pub fn latest_purchase_date(events: &[PurchaseEvent]) -> Option<NaiveDate> {
    events.iter().map(|e| e.date).max()
}

fn text_column(df: &DataFrame, name: &str) -> crate::Result<Series> {
    df.column(name)
        .map_err(|_| AnalyticsError::DataFormat(format!("missing required column '{name}'")))?
        .cast(&DataType::String)
        .map_err(|_| AnalyticsError::DataFormat(format!("column '{name}' is not text")))
}

fn numeric_column(df: &DataFrame, name: &str) -> crate::Result<Series> {
    df.column(name)
        .map_err(|_| AnalyticsError::DataFormat(format!("missing required column '{name}'")))?
        .cast(&DataType::Float64)
        .map_err(|_| AnalyticsError::DataFormat(format!("column '{name}' is not numeric")))
}

fn string_values(series: &Series) -> crate::Result<Vec<Option<String>>> {
    let chunked = series
        .str()
        .map_err(|e| AnalyticsError::DataFormat(e.to_string()))?;
    Ok(chunked
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

fn required<'a>(
    values: &'a [Option<String>],
    row: usize,
    column: &str,
) -> crate::Result<&'a str> {
    match values.get(row).and_then(|v| v.as_deref()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AnalyticsError::DataFormat(format!(
            "row {}: missing '{column}'",
            row + 1
        ))),
    }
}

/// Accept plain calendar dates and the common datetime forms seen in exports.
fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    None
}
