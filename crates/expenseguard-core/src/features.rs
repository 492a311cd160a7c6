//! Feature matrix construction for the fraud model
//!
//! Each row becomes `[V1, ..., V28, scaled Amount]`. The order is built
//! explicitly from column names and checked against the names the model
//! declares; a silent reordering would mislabel every transaction.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::FraudRow;
use crate::predictors::{AmountScaler, FraudModel};
use crate::schema::{fraud_columns, V_FEATURE_COUNT};

/// Width of a fraud feature vector
pub const FEATURE_COUNT: usize = V_FEATURE_COUNT + 1;

/// One model input row, in [`fraud_columns`] order
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Ensure the model expects exactly our feature order
pub fn check_model_features(model: &dyn FraudModel) -> Result<()> {
    let ours = fraud_columns();
    let theirs = model.feature_names();

    if theirs.len() != ours.len() {
        return Err(Error::FeatureShapeMismatch {
            expected: format!("{} features", theirs.len()),
            actual: format!("{} features", ours.len()),
        });
    }

    if let Some((i, (want, have))) = theirs
        .iter()
        .zip(ours.iter())
        .enumerate()
        .find(|(_, (want, have))| want != have)
    {
        return Err(Error::FeatureShapeMismatch {
            expected: format!("'{}' at position {}", want, i),
            actual: format!("'{}'", have),
        });
    }

    Ok(())
}

/// Scale the Amount column and assemble one feature vector per row
pub fn build_features(rows: &[FraudRow], scaler: &dyn AmountScaler) -> Result<Vec<FeatureVector>> {
    let amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
    let scaled = scaler.transform(&amounts)?;

    if scaled.len() != amounts.len() {
        return Err(Error::FeatureShapeMismatch {
            expected: format!("{} scaled amounts", amounts.len()),
            actual: format!("{} scaled amounts", scaled.len()),
        });
    }

    let features: Vec<FeatureVector> = rows
        .iter()
        .zip(scaled)
        .map(|(row, amount)| {
            let mut vector = [0.0; FEATURE_COUNT];
            vector[..V_FEATURE_COUNT].copy_from_slice(&row.v);
            vector[V_FEATURE_COUNT] = amount;
            vector
        })
        .collect();

    debug!(rows = features.len(), width = FEATURE_COUNT, "Built feature matrix");
    Ok(features)
}
