//! Fraud scoring and forecast command implementations

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use expenseguard_core::{
    parse_csv, parse_json_records,
    pipeline::{CATEGORY, IS_FRAUD},
    schema::{AMOUNT, DESCRIPTION},
    Batch, ForecastReport, FraudReport, PipelineConfig, Record,
};
use serde::Serialize;

use super::{open_pipeline, truncate};

/// Read a batch from a CSV file, or a JSON array when the extension is `.json`
pub fn read_batch(file: &Path) -> Result<Batch> {
    let is_json = file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        let data =
            fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;
        parse_json_records(&data).with_context(|| format!("Failed to parse {}", file.display()))
    } else {
        let csv_file =
            File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
        parse_csv(csv_file).with_context(|| format!("Failed to parse {}", file.display()))
    }
}

fn write_json<T: Serialize>(value: &T, output: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("   Wrote {}", output.display());
    Ok(())
}

pub fn cmd_score(
    config: &PipelineConfig,
    file: &Path,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let pipeline = open_pipeline(config)?;
    let batch = read_batch(file)?;
    let report = pipeline.score_batch(batch).context("Failed to score transactions")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_fraud_summary(file, &report);
    }

    if let Some(out) = output {
        write_json(&report, out)?;
    }

    Ok(())
}

/// Row index and record of every transaction labelled as fraud
pub fn flagged_rows(report: &FraudReport) -> Vec<(usize, &Record)> {
    report
        .all_transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| tx.get(IS_FRAUD).and_then(|v| v.as_u64()) == Some(1))
        .collect()
}

fn print_fraud_summary(file: &Path, report: &FraudReport) {
    println!("🔍 Scored {}", file.display());
    println!("   Transactions: {}", report.total_transactions);
    println!(
        "   Flagged as fraud: {}",
        report.transactions_flagged_as_fraud
    );
    let categories: Vec<&str> = report.categories_found.iter().map(|c| c.as_str()).collect();
    println!("   Categories: {}", categories.join(", "));

    let flagged = flagged_rows(report);
    if flagged.is_empty() {
        return;
    }

    println!();
    println!("{:<6} {:>12}  {:<32} Category", "Row", "Amount", "Description");
    println!("{}", "-".repeat(72));
    for (row, tx) in flagged {
        let amount = tx
            .get(AMOUNT)
            .and_then(|v| v.as_f64())
            .map(|a| format!("{:.2}", a))
            .unwrap_or_default();
        let description = tx
            .get(DESCRIPTION)
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let category = tx.get(CATEGORY).and_then(|v| v.as_str()).unwrap_or("-");
        println!(
            "{:<6} {:>12}  {:<32} {}",
            row,
            amount,
            truncate(description, 32),
            category
        );
    }
}

pub fn cmd_forecast(
    config: &PipelineConfig,
    file: &Path,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let pipeline = open_pipeline(config)?;
    let batch = read_batch(file)?;
    let report = pipeline
        .forecast_batch(&batch)
        .context("Failed to generate forecast")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_forecast_table(&report, config.forecast.horizon_days as usize);
    }

    if let Some(out) = output {
        write_json(&report, out)?;
    }

    Ok(())
}

fn print_forecast_table(report: &ForecastReport, horizon: usize) {
    let history = report.forecast.len().saturating_sub(horizon);
    println!(
        "📈 Forecast: {} historical day(s), {} day(s) ahead",
        history, horizon
    );
    println!();
    println!("{:<12} {:>12} {:>12} {:>12}", "Date", "Predicted", "Lower", "Upper");
    println!("{}", "-".repeat(51));
    for point in report.forecast.iter().skip(history) {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2}",
            point.ds, point.yhat, point.yhat_lower, point.yhat_upper
        );
    }
}
