//! Test utilities for expenseguard-core
//!
//! Builders for record batches and mock model bundles shared by unit tests,
//! the integration tests and the server tests.

use std::sync::Arc;

use serde_json::Value;

use crate::import::batch_from_records;
use crate::models::{Batch, Record};
use crate::predictors::{MockForecaster, MockFraudModel, MockScaler, ModelBundle};
use crate::schema::{AMOUNT, DESCRIPTION, TIME, V_FEATURE_COUNT};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A fraud-schema record with every V feature zero
pub fn fraud_record(amount: f64, description: Option<&str>) -> Record {
    let mut record = Record::new();
    for i in 1..=V_FEATURE_COUNT {
        record.insert(format!("V{}", i), Value::from(0.0));
    }
    record.insert(AMOUNT.to_string(), Value::from(amount));
    if let Some(desc) = description {
        record.insert(DESCRIPTION.to_string(), Value::from(desc));
    }
    record
}

/// Batch of fraud-schema records from `(amount, description)` pairs
pub fn fraud_batch(rows: &[(f64, Option<&str>)]) -> Batch {
    batch_from_records(
        rows.iter()
            .map(|(amount, desc)| fraud_record(*amount, *desc))
            .collect(),
    )
}

/// Batch with `Time` and `Amount` columns from `(time, amount)` pairs
pub fn timed_batch(rows: &[(f64, f64)]) -> Batch {
    batch_from_records(
        rows.iter()
            .map(|(time, amount)| {
                let mut record = Record::new();
                record.insert(AMOUNT.to_string(), Value::from(*amount));
                record.insert(TIME.to_string(), Value::from(*time));
                record
            })
            .collect(),
    )
}

/// One transaction per day for `days` consecutive days starting 1970-01-01
pub fn daily_history_batch(days: usize, amount: f64) -> Batch {
    let rows: Vec<(f64, f64)> = (0..days)
        .map(|i| (i as f64 * SECONDS_PER_DAY + 3_600.0, amount))
        .collect();
    timed_batch(&rows)
}

/// Bundle with the given mocks and an identity scaler
pub fn mock_bundle(model: MockFraudModel, forecaster: MockForecaster) -> ModelBundle {
    ModelBundle::new(
        Arc::new(model),
        Arc::new(MockScaler::identity()),
        Arc::new(forecaster),
    )
}

/// CSV text in the fraud schema, with a Description column
pub fn fraud_csv(rows: &[(f64, &str)]) -> String {
    let mut header: Vec<String> = (1..=V_FEATURE_COUNT).map(|i| format!("V{}", i)).collect();
    header.push(AMOUNT.to_string());
    header.push(DESCRIPTION.to_string());

    let mut out = header.join(",");
    out.push('\n');
    for (amount, desc) in rows {
        let zeros = vec!["0"; V_FEATURE_COUNT].join(",");
        out.push_str(&format!("{},{},\"{}\"\n", zeros, amount, desc));
    }
    out
}
