//! Pluggable predictor abstraction
//!
//! The pipeline never depends on a concrete model. It talks to three
//! collaborators through traits:
//!
//! - `FraudModel`: 29-wide feature rows in, one 0/1 label per row out
//! - `AmountScaler`: the pre-fit transform applied to the Amount column
//! - `Forecaster`: daily history in, per-day prediction with bounds out
//!
//! # Architecture
//!
//! - `ModelBundle`: the immutable set of collaborators, loaded once at startup
//!   and shared read-only across requests
//! - Implementations: `LinearFraudModel` + `StandardScaler` (parameter files),
//!   `TrendForecaster` (no files), and mocks for tests
//!
//! # Model directory
//!
//! - `fraud_model.json`: `{"feature_names": [...], "coefficients": [...], "intercept": f, "threshold": f}`
//! - `amount_scaler.json`: `{"mean": f, "scale": f}`

pub mod linear;
pub mod mock;
pub mod trend;

pub use linear::{LinearFraudModel, StandardScaler};
pub use mock::{MockFraudModel, MockForecaster, MockScaler};
pub use trend::TrendForecaster;

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::models::{DailyPoint, ForecastRow, FraudLabel};

pub const FRAUD_MODEL_FILE: &str = "fraud_model.json";
pub const SCALER_FILE: &str = "amount_scaler.json";

/// Binary fraud classifier
pub trait FraudModel: Send + Sync {
    /// Feature names in the order the model was trained on
    fn feature_names(&self) -> &[String];

    /// One label per row, in input order
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<FraudLabel>>;
}

/// Pre-fit transform for the Amount column
pub trait AmountScaler: Send + Sync {
    /// Same length as the input
    fn transform(&self, amounts: &[f64]) -> Result<Vec<f64>>;
}

/// Daily time-series forecaster
pub trait Forecaster: Send + Sync {
    /// One row per historical day followed by `horizon_days` consecutive future days
    fn forecast(&self, history: &[DailyPoint], horizon_days: u32) -> Result<Vec<ForecastRow>>;
}

/// The `horizon_days` calendar days following `last`
///
/// Fails instead of overflowing when the horizon runs past the last
/// representable date.
pub fn future_days(last: NaiveDate, horizon_days: u32) -> Result<Vec<NaiveDate>> {
    (1..=i64::from(horizon_days))
        .map(|i| {
            last.checked_add_signed(Duration::days(i)).ok_or_else(|| {
                Error::Forecast(format!(
                    "Forecast horizon of {} days runs past the last supported date from {}",
                    horizon_days, last
                ))
            })
        })
        .collect()
}

/// Immutable set of models shared by every request
#[derive(Clone)]
pub struct ModelBundle {
    pub fraud_model: Option<Arc<dyn FraudModel>>,
    pub scaler: Option<Arc<dyn AmountScaler>>,
    pub forecaster: Arc<dyn Forecaster>,
}

impl ModelBundle {
    pub fn new(
        fraud_model: Arc<dyn FraudModel>,
        scaler: Arc<dyn AmountScaler>,
        forecaster: Arc<dyn Forecaster>,
    ) -> Self {
        Self {
            fraud_model: Some(fraud_model),
            scaler: Some(scaler),
            forecaster,
        }
    }

    /// Load models from a directory
    ///
    /// Missing parameter files are logged and leave the fraud path unavailable;
    /// files that exist but fail to parse are an error.
    pub fn load(dir: &Path, forecast: &ForecastConfig) -> Result<Self> {
        let fraud_model = load_optional(&dir.join(FRAUD_MODEL_FILE), LinearFraudModel::from_file)?
            .map(|m| Arc::new(m) as Arc<dyn FraudModel>);
        let scaler = load_optional(&dir.join(SCALER_FILE), StandardScaler::from_file)?
            .map(|s| Arc::new(s) as Arc<dyn AmountScaler>);

        if fraud_model.is_some() && scaler.is_some() {
            info!(dir = %dir.display(), "Fraud model and scaler loaded");
        } else {
            warn!(
                dir = %dir.display(),
                "Fraud model or scaler not found; fraud scoring is disabled"
            );
        }

        Ok(Self {
            fraud_model,
            scaler,
            forecaster: Arc::new(TrendForecaster::new(forecast.interval_width)),
        })
    }

    /// The fraud model and scaler, or an error naming what is missing
    pub fn fraud_pair(&self) -> Result<(&dyn FraudModel, &dyn AmountScaler)> {
        match (&self.fraud_model, &self.scaler) {
            (Some(model), Some(scaler)) => Ok((model.as_ref(), scaler.as_ref())),
            (None, _) => Err(Error::ModelUnavailable("Fraud model not loaded".into())),
            (_, None) => Err(Error::ModelUnavailable("Amount scaler not loaded".into())),
        }
    }

    pub fn fraud_ready(&self) -> bool {
        self.fraud_model.is_some() && self.scaler.is_some()
    }
}

fn load_optional<T>(path: &Path, loader: fn(&Path) -> Result<T>) -> Result<Option<T>> {
    match loader(path) {
        Ok(value) => Ok(Some(value)),
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Model file not found");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
