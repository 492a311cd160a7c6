//! Schema validation for uploaded batches
//!
//! Required columns are checked before any numeric work. Only after a batch
//! passes is it turned into typed rows ([`FraudRow`], [`TimedAmount`]).

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Batch, FraudRow, Record, TimedAmount};

pub const AMOUNT: &str = "Amount";
pub const TIME: &str = "Time";
pub const DESCRIPTION: &str = "Description";

/// Number of opaque model inputs (V1..V28)
pub const V_FEATURE_COUNT: usize = 28;

/// Columns the fraud model consumes, in model order: V1..V28 then Amount
pub fn fraud_columns() -> Vec<String> {
    (1..=V_FEATURE_COUNT)
        .map(|i| format!("V{}", i))
        .chain(std::iter::once(AMOUNT.to_string()))
        .collect()
}

/// Columns the daily aggregator consumes
pub fn forecast_columns() -> Vec<String> {
    vec![AMOUNT.to_string(), TIME.to_string()]
}

/// Check that every required column is present
///
/// Reports all absent columns, in the order they were required.
pub fn validate_columns(batch: &Batch, required: &[String]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !batch.has_column(col))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingColumns(missing))
    }
}

/// Read a required numeric cell
fn numeric(record: &Record, row: usize, column: &str) -> Result<f64> {
    let invalid = |reason: &str| Error::InvalidValue {
        row,
        column: column.to_string(),
        reason: reason.to_string(),
    };

    match record.get(column) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid("not representable as f64")),
        Some(Value::Null) | None => Err(invalid("missing value")),
        Some(other) => Err(invalid(&format!("expected a number, got {}", other))),
    }
}

/// Validate and type a batch for the fraud path
pub fn fraud_rows(batch: &Batch) -> Result<Vec<FraudRow>> {
    validate_columns(batch, &fraud_columns())?;

    let v_columns: Vec<String> = (1..=V_FEATURE_COUNT).map(|i| format!("V{}", i)).collect();

    batch
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let mut v = [0.0; V_FEATURE_COUNT];
            for (slot, column) in v.iter_mut().zip(&v_columns) {
                *slot = numeric(record, row, column)?;
            }
            Ok(FraudRow {
                v,
                amount: numeric(record, row, AMOUNT)?,
            })
        })
        .collect()
}

/// Validate and type a batch for the forecast path
pub fn timed_amounts(batch: &Batch) -> Result<Vec<TimedAmount>> {
    validate_columns(batch, &forecast_columns())?;

    batch
        .records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            Ok(TimedAmount {
                time: numeric(record, row, TIME)?,
                amount: numeric(record, row, AMOUNT)?,
            })
        })
        .collect()
}
