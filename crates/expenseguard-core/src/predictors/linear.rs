//! Parameter-file models: logistic fraud classifier and standard scaler

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::models::FraudLabel;

use super::{AmountScaler, FraudModel};

fn default_threshold() -> f64 {
    0.5
}

/// Logistic-regression fraud classifier evaluated from exported parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearFraudModel {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    /// Probability at or above which a row is labeled fraud
    #[serde(default = "default_threshold")]
    threshold: f64,
}

impl LinearFraudModel {
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
        threshold: f64,
    ) -> Result<Self> {
        let model = Self {
            feature_names,
            coefficients,
            intercept,
            threshold,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content)?;
        model.validate()?;
        debug!(
            path = %path.display(),
            features = model.feature_names.len(),
            threshold = model.threshold,
            "Loaded fraud model parameters"
        );
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.feature_names.len() != self.coefficients.len() {
            return Err(Error::Config(format!(
                "Fraud model has {} feature names but {} coefficients",
                self.feature_names.len(),
                self.coefficients.len()
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::Config(format!(
                "Fraud model threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    /// Fraud probability for one row
    pub fn probability(&self, features: &FeatureVector) -> f64 {
        let z: f64 = self
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-z).exp())
    }
}

impl FraudModel for LinearFraudModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<FraudLabel>> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(Error::FeatureShapeMismatch {
                expected: format!("{} features", self.coefficients.len()),
                actual: format!("{} features", FEATURE_COUNT),
            });
        }

        Ok(features
            .iter()
            .map(|row| FraudLabel::from(self.probability(row) >= self.threshold))
            .collect())
    }
}

/// Standardization `(x - mean) / scale` fit on the training amounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    pub fn new(mean: f64, scale: f64) -> Self {
        Self { mean, scale }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let scaler: Self = serde_json::from_str(&content)?;
        if !scaler.mean.is_finite() || !scaler.scale.is_finite() {
            return Err(Error::Config(format!(
                "Scaler parameters in {} must be finite",
                path.display()
            )));
        }
        Ok(scaler)
    }
}

impl AmountScaler for StandardScaler {
    fn transform(&self, amounts: &[f64]) -> Result<Vec<f64>> {
        // A constant training column has zero variance; leave it unscaled
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        Ok(amounts.iter().map(|x| (x - self.mean) / scale).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::fraud_columns;

    fn model_with_amount_weight(weight: f64, intercept: f64) -> LinearFraudModel {
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[FEATURE_COUNT - 1] = weight;
        LinearFraudModel::new(fraud_columns(), coefficients, intercept, 0.5).unwrap()
    }

    #[test]
    fn test_predict_threshold() {
        let model = model_with_amount_weight(1.0, 0.0);

        let mut low = [0.0; FEATURE_COUNT];
        low[28] = -2.0;
        let mut high = [0.0; FEATURE_COUNT];
        high[28] = 2.0;

        let labels = model.predict(&[low, high]).unwrap();
        assert_eq!(labels, vec![FraudLabel::Normal, FraudLabel::Fraud]);
    }

    #[test]
    fn test_probability_at_zero() {
        let model = model_with_amount_weight(1.0, 0.0);
        let p = model.probability(&[0.0; FEATURE_COUNT]);
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_width_model_is_shape_mismatch() {
        let names: Vec<String> = (1..=30).map(|i| format!("F{}", i)).collect();
        let model = LinearFraudModel::new(names, vec![0.0; 30], 0.0, 0.5).unwrap();

        let err = model.predict(&[[0.0; FEATURE_COUNT]]).unwrap_err();
        assert!(matches!(err, Error::FeatureShapeMismatch { .. }));
    }

    #[test]
    fn test_new_rejects_inconsistent_parameters() {
        assert!(LinearFraudModel::new(fraud_columns(), vec![0.0; 3], 0.0, 0.5).is_err());
        assert!(LinearFraudModel::new(fraud_columns(), vec![0.0; 29], 0.0, 1.5).is_err());
    }

    #[test]
    fn test_threshold_defaults_when_absent() {
        let json = serde_json::json!({
            "feature_names": fraud_columns(),
            "coefficients": vec![0.0; 29],
            "intercept": 0.0
        });
        let model: LinearFraudModel = serde_json::from_value(json).unwrap();
        assert_eq!(model.threshold, 0.5);
    }

    #[test]
    fn test_standard_scaler() {
        let scaler = StandardScaler::new(100.0, 50.0);
        assert_eq!(scaler.transform(&[100.0, 200.0, 0.0]).unwrap(), vec![0.0, 2.0, -2.0]);

        let flat = StandardScaler::new(10.0, 0.0);
        assert_eq!(flat.transform(&[12.0]).unwrap(), vec![2.0]);
    }
}
