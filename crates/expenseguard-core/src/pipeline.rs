//! Request pipeline and response assembly
//!
//! A [`Pipeline`] owns the immutable models and rule engine and runs one
//! uploaded batch to completion:
//!
//! - fraud path: validate → features → fraud model → labels + categories → [`FraudReport`]
//! - forecast path: validate → daily totals → history check → forecaster → [`ForecastReport`]
//!
//! It holds no per-request state and is shared across threads as-is.

use serde_json::Value;
use tracing::info;

use crate::aggregate::{aggregate_daily, ensure_history};
use crate::categorize::Categorizer;
use crate::config::{ForecastConfig, PipelineConfig};
use crate::error::{Error, Result};
use crate::features::{build_features, check_model_features};
use crate::models::{
    Batch, Category, ForecastPoint, ForecastReport, ForecastRow, FraudLabel, FraudReport, Record,
};
use crate::predictors::ModelBundle;
use crate::schema::{self, DESCRIPTION};

/// Column added to every record with the fraud label (0 or 1)
pub const IS_FRAUD: &str = "is_fraud";
/// Column added to every record with the assigned category
pub const CATEGORY: &str = "category";

pub struct Pipeline {
    models: ModelBundle,
    categorizer: Categorizer,
    forecast: ForecastConfig,
}

impl Pipeline {
    pub fn new(models: ModelBundle, config: &PipelineConfig) -> Self {
        Self::with_parts(
            models,
            Categorizer::new(config.match_mode),
            config.forecast.clone(),
        )
    }

    pub fn with_parts(models: ModelBundle, categorizer: Categorizer, forecast: ForecastConfig) -> Self {
        Self {
            models,
            categorizer,
            forecast,
        }
    }

    pub fn models(&self) -> &ModelBundle {
        &self.models
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    pub fn forecast_config(&self) -> &ForecastConfig {
        &self.forecast
    }

    /// Score a batch for fraud and categorize every row
    pub fn score_batch(&self, batch: Batch) -> Result<FraudReport> {
        let rows = schema::fraud_rows(&batch)?;
        let (model, scaler) = self.models.fraud_pair()?;
        check_model_features(model)?;

        let features = build_features(&rows, scaler)?;
        let labels = if features.is_empty() {
            Vec::new()
        } else {
            model.predict(&features)?
        };

        if labels.len() != rows.len() {
            return Err(Error::FeatureShapeMismatch {
                expected: format!("{} labels", rows.len()),
                actual: format!("{} labels", labels.len()),
            });
        }

        let categories = self.categorize_batch(&batch);
        let report = assemble_fraud_report(batch.records, &labels, &categories);

        info!(
            total = report.total_transactions,
            flagged = report.transactions_flagged_as_fraud,
            categories = report.categories_found.len(),
            "Scored batch"
        );
        Ok(report)
    }

    /// One category per record; N/A for all when there is no Description column
    pub fn categorize_batch(&self, batch: &Batch) -> Vec<Category> {
        if !batch.has_column(DESCRIPTION) {
            return vec![Category::NotAvailable; batch.len()];
        }
        batch
            .records
            .iter()
            .map(|record| self.categorizer.categorize_value(record.get(DESCRIPTION)))
            .collect()
    }

    /// Aggregate a batch into daily totals and forecast ahead
    pub fn forecast_batch(&self, batch: &Batch) -> Result<ForecastReport> {
        let rows = schema::timed_amounts(batch)?;
        let history = aggregate_daily(&rows)?;
        ensure_history(&history, self.forecast.min_history_days)?;

        let horizon = self.forecast.horizon_days;
        let predicted = self.models.forecaster.forecast(&history, horizon)?;

        let expected = history.len() + horizon as usize;
        if predicted.len() != expected {
            return Err(Error::Forecast(format!(
                "Forecaster returned {} rows, expected {}",
                predicted.len(),
                expected
            )));
        }

        info!(
            rows = rows.len(),
            days = history.len(),
            horizon,
            "Forecast generated"
        );
        Ok(assemble_forecast(predicted))
    }
}

/// Attach labels and categories to the original records and summarize
pub fn assemble_fraud_report(
    mut records: Vec<Record>,
    labels: &[FraudLabel],
    categories: &[Category],
) -> FraudReport {
    let mut categories_found: Vec<Category> = Vec::new();

    for ((record, label), category) in records.iter_mut().zip(labels).zip(categories) {
        record.insert(IS_FRAUD.to_string(), Value::from(label.as_u8()));
        record.insert(CATEGORY.to_string(), Value::from(category.as_str()));
        if !categories_found.contains(category) {
            categories_found.push(*category);
        }
    }

    FraudReport {
        message: "File processed successfully!".to_string(),
        total_transactions: records.len(),
        transactions_flagged_as_fraud: labels.iter().filter(|l| l.is_fraud()).count(),
        categories_found,
        all_transactions: records,
    }
}

/// Reshape forecaster output into client-facing points
pub fn assemble_forecast(rows: Vec<ForecastRow>) -> ForecastReport {
    ForecastReport {
        forecast: rows
            .into_iter()
            .map(|row| ForecastPoint {
                ds: row.day.format("%Y-%m-%d").to_string(),
                yhat: row.predicted,
                yhat_lower: row.lower,
                yhat_upper: row.upper,
            })
            .collect(),
    }
}
