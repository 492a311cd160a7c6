//! ExpenseGuard Core Library
//!
//! Transaction pipeline behind the ExpenseGuard API and CLI:
//! - CSV and JSON batch import with typed cells
//! - Schema validation for the fraud and forecast paths
//! - Fraud scoring through a pluggable model and amount scaler
//! - Keyword categorization of transaction descriptions
//! - Daily aggregation and spending forecasts
//! - Layered TOML configuration

pub mod aggregate;
pub mod categorize;
pub mod config;
pub mod error;
pub mod features;
pub mod import;
pub mod models;
pub mod pipeline;
pub mod predictors;
pub mod schema;

/// Batch builders and mock bundles for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use categorize::{Categorizer, CATEGORY_KEYWORDS};
pub use config::{ForecastConfig, MatchMode, PipelineConfig, ServerLimits};
pub use error::{Error, ErrorKind, Result};
pub use import::{parse_csv, parse_json_records};
pub use models::*;
pub use pipeline::Pipeline;
pub use predictors::{
    AmountScaler, Forecaster, FraudModel, LinearFraudModel, MockForecaster, MockFraudModel,
    MockScaler, ModelBundle, StandardScaler, TrendForecaster,
};
