//! Mock predictors for testing
//!
//! Deterministic stand-ins for the fraud model, scaler and forecaster that
//! record how often they were called.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::models::{DailyPoint, ForecastRow, FraudLabel};
use crate::schema::fraud_columns;

use super::{future_days, AmountScaler, Forecaster, FraudModel};

#[derive(Debug, Clone)]
enum MockRule {
    /// Label every row normal
    Never,
    /// Return these labels verbatim, whatever the input
    Fixed(Vec<FraudLabel>),
    /// Fraud when the scaled amount exceeds the limit
    ScaledAmountAbove(f64),
}

/// Mock fraud model
#[derive(Debug)]
pub struct MockFraudModel {
    names: Vec<String>,
    rule: MockRule,
    calls: AtomicUsize,
}

impl MockFraudModel {
    fn with_rule(rule: MockRule) -> Self {
        Self {
            names: fraud_columns(),
            rule,
            calls: AtomicUsize::new(0),
        }
    }

    /// Labels every row normal
    pub fn never() -> Self {
        Self::with_rule(MockRule::Never)
    }

    /// Returns exactly these labels
    pub fn with_labels(labels: Vec<FraudLabel>) -> Self {
        Self::with_rule(MockRule::Fixed(labels))
    }

    /// Flags rows whose scaled amount exceeds `limit`
    pub fn flag_scaled_amount_above(limit: f64) -> Self {
        Self::with_rule(MockRule::ScaledAmountAbove(limit))
    }

    /// Override the declared feature order
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    /// Number of predict calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FraudModel for MockFraudModel {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<FraudLabel>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.rule {
            MockRule::Never => vec![FraudLabel::Normal; features.len()],
            MockRule::Fixed(labels) => labels.clone(),
            MockRule::ScaledAmountAbove(limit) => features
                .iter()
                .map(|row| FraudLabel::from(row[FEATURE_COUNT - 1] > *limit))
                .collect(),
        })
    }
}

/// Mock amount scaler
#[derive(Debug, Clone, Copy)]
pub struct MockScaler {
    factor: f64,
    offset: f64,
    drop_last: bool,
}

impl MockScaler {
    /// Returns amounts unchanged
    pub fn identity() -> Self {
        Self::affine(1.0, 0.0)
    }

    /// `x * factor + offset`
    pub fn affine(factor: f64, offset: f64) -> Self {
        Self {
            factor,
            offset,
            drop_last: false,
        }
    }

    /// Misbehaving scaler that returns one value too few
    pub fn dropping_last() -> Self {
        Self {
            drop_last: true,
            ..Self::identity()
        }
    }
}

impl AmountScaler for MockScaler {
    fn transform(&self, amounts: &[f64]) -> Result<Vec<f64>> {
        let mut out: Vec<f64> = amounts
            .iter()
            .map(|x| x * self.factor + self.offset)
            .collect();
        if self.drop_last {
            out.pop();
        }
        Ok(out)
    }
}

/// Mock forecaster: flat prediction at the historical mean, bounds ±1
#[derive(Debug, Default)]
pub struct MockForecaster {
    failing: bool,
    calls: AtomicUsize,
}

impl MockForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forecaster whose every call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of forecast calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Forecaster for MockForecaster {
    fn forecast(&self, history: &[DailyPoint], horizon_days: u32) -> Result<Vec<ForecastRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(Error::Forecast("mock forecaster failure".into()));
        }
        let last = history
            .last()
            .ok_or_else(|| Error::Forecast("empty history".into()))?;

        let mean = history.iter().map(|p| p.amount).sum::<f64>() / history.len() as f64;
        let future = future_days(last.day, horizon_days)?;

        Ok(history
            .iter()
            .map(|p| p.day)
            .chain(future)
            .map(|day| ForecastRow {
                day,
                predicted: mean,
                lower: mean - 1.0,
                upper: mean + 1.0,
            })
            .collect())
    }
}
