//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::Path;

use clap::Parser;
use expenseguard_core::{
    predictors::{FRAUD_MODEL_FILE, SCALER_FILE},
    schema::fraud_columns,
    MatchMode, PipelineConfig,
};
use serde_json::json;
use tempfile::TempDir;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate};

/// Model flagging any Amount above 500 (scaled by 1/100, intercept -5)
fn write_models(dir: &Path) {
    let mut coefficients = vec![0.0; 29];
    coefficients[28] = 1.0;
    fs::write(
        dir.join(FRAUD_MODEL_FILE),
        json!({
            "feature_names": fraud_columns(),
            "coefficients": coefficients,
            "intercept": -5.0
        })
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join(SCALER_FILE),
        json!({"mean": 0.0, "scale": 100.0}).to_string(),
    )
    .unwrap();
}

fn test_config(dir: &TempDir) -> PipelineConfig {
    write_models(dir.path());
    PipelineConfig {
        model_dir: dir.path().to_path_buf(),
        ..Default::default()
    }
}

fn write_fraud_csv(dir: &TempDir) -> std::path::PathBuf {
    let header: Vec<String> = (1..=28)
        .map(|i| format!("V{}", i))
        .chain(["Amount".to_string(), "Description".to_string()])
        .collect();
    let zeros = vec!["0"; 28].join(",");
    let csv = format!(
        "{}\n{z},12.00,STARBUCKS #4521\n{z},900.00,DELTA AIR\n",
        header.join(","),
        z = zeros
    );
    let path = dir.path().join("tx.csv");
    fs::write(&path, csv).unwrap();
    path
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["expenseguard", "serve"]).unwrap();
    let Commands::Serve {
        port,
        host,
        static_dir,
        allowed_origins,
    } = cli.command
    else {
        panic!("expected serve command");
    };
    assert_eq!(port, 5000);
    assert_eq!(host, "127.0.0.1");
    assert!(static_dir.is_none());
    assert!(allowed_origins.is_empty());
}

#[test]
fn test_parse_serve_origins() {
    let cli = Cli::try_parse_from([
        "expenseguard",
        "serve",
        "--allowed-origins",
        "http://localhost:3000,https://app.example.com",
    ])
    .unwrap();
    let Commands::Serve {
        allowed_origins, ..
    } = cli.command
    else {
        panic!("expected serve command");
    };
    assert_eq!(
        allowed_origins,
        vec!["http://localhost:3000", "https://app.example.com"]
    );
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "expenseguard",
        "score",
        "--file",
        "tx.csv",
        "--models",
        "/opt/models",
        "--config",
        "custom.toml",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.models.unwrap(), Path::new("/opt/models"));
    assert_eq!(cli.config.unwrap(), Path::new("custom.toml"));
    assert!(matches!(cli.command, Commands::Score { json: false, .. }));
}

#[test]
fn test_parse_categorize_mode() {
    let cli = Cli::try_parse_from([
        "expenseguard",
        "categorize",
        "--mode",
        "phrase",
        "AMAZON PRIME",
        "SHELL OIL",
    ])
    .unwrap();
    let Commands::Categorize { descriptions, mode } = cli.command else {
        panic!("expected categorize command");
    };
    assert_eq!(mode, Some(MatchMode::Phrase));
    assert_eq!(descriptions, vec!["AMAZON PRIME", "SHELL OIL"]);
}

#[test]
fn test_parse_rejects_unknown_mode() {
    assert!(Cli::try_parse_from(["expenseguard", "keywords", "--mode", "fuzzy"]).is_err());
}

#[test]
fn test_parse_categorize_requires_description() {
    assert!(Cli::try_parse_from(["expenseguard", "categorize"]).is_err());
}

// ========== Command Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("SHELL", 10), "SHELL");
    assert_eq!(truncate("STARBUCKS COFFEE #4521", 10), "STARBUC...");
    assert_eq!(truncate("CAFÉ ÉCLAIR", 6), "CAF...");
}

#[test]
fn test_load_config_models_override() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("pipeline.toml");
    fs::write(&config_path, "[models]\ndir = \"from-file\"\n").unwrap();

    let config = commands::load_config(Some(&config_path), Some(Path::new("from-flag"))).unwrap();
    assert_eq!(config.model_dir, Path::new("from-flag"));
}

#[test]
fn test_load_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.toml");

    let err = commands::load_config(Some(&missing), None).unwrap_err();
    assert!(format!("{:#}", err).contains("Config file not found"));
}

#[test]
fn test_read_batch_csv_and_json() {
    let dir = TempDir::new().unwrap();

    let csv_path = dir.path().join("tx.csv");
    fs::write(&csv_path, "Time,Amount\n0,1.5\n86400,2\n").unwrap();
    let batch = commands::read_batch(&csv_path).unwrap();
    assert_eq!(batch.columns, vec!["Time", "Amount"]);
    assert_eq!(batch.len(), 2);

    let json_path = dir.path().join("tx.JSON");
    fs::write(&json_path, r#"[{"Time": 0, "Amount": 1.5}]"#).unwrap();
    let batch = commands::read_batch(&json_path).unwrap();
    assert_eq!(batch.len(), 1);
}

#[test]
fn test_read_batch_missing_file() {
    let result = commands::read_batch(Path::new("/nonexistent/tx.csv"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_categorize() {
    let config = PipelineConfig::default();
    let descriptions = vec!["STARBUCKS #4521".to_string(), "".to_string()];
    assert!(commands::cmd_categorize(&config, None, &descriptions).is_ok());
    assert!(commands::cmd_categorize(&config, Some(MatchMode::Phrase), &descriptions).is_ok());
}

#[test]
fn test_cmd_keywords() {
    let config = PipelineConfig::default();
    assert!(commands::cmd_keywords(&config, None).is_ok());
    assert!(commands::cmd_keywords(&config, Some(MatchMode::Phrase)).is_ok());
}

#[test]
fn test_cmd_score_writes_report() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let input = write_fraud_csv(&dir);
    let output = dir.path().join("report.json");

    commands::cmd_score(&config, &input, false, Some(&output)).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["total_transactions"], 2);
    assert_eq!(report["transactions_flagged_as_fraud"], 1);
    assert_eq!(report["all_transactions"][0]["category"], "Restaurants/Dining");
    assert_eq!(report["all_transactions"][1]["is_fraud"], 1);
}

#[test]
fn test_flagged_rows() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let input = write_fraud_csv(&dir);

    let pipeline = commands::open_pipeline(&config).unwrap();
    let report = pipeline
        .score_batch(commands::read_batch(&input).unwrap())
        .unwrap();

    let flagged = commands::flagged_rows(&report);
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].0, 1);
    assert_eq!(flagged[0].1["Description"], "DELTA AIR");
}

#[test]
fn test_cmd_score_without_models() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig {
        model_dir: dir.path().join("empty"),
        ..Default::default()
    };
    let input = write_fraud_csv(&dir);

    let err = commands::cmd_score(&config, &input, false, None).unwrap_err();
    assert!(format!("{:#}", err).contains("Fraud model not loaded"));
}

#[test]
fn test_cmd_forecast_from_json() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let records: Vec<serde_json::Value> = (0..15)
        .map(|d| json!({"Time": d * 86_400 + 10, "Amount": 10 + d}))
        .collect();
    let input = dir.path().join("history.json");
    fs::write(&input, serde_json::to_string(&records).unwrap()).unwrap();
    let output = dir.path().join("forecast.json");

    commands::cmd_forecast(&config, &input, false, Some(&output)).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let forecast = report["forecast"].as_array().unwrap();
    assert_eq!(forecast.len(), 15 + 30);
    assert_eq!(forecast[44]["ds"], "1970-02-14");
}

#[test]
fn test_cmd_forecast_insufficient_history() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let input = dir.path().join("short.csv");
    fs::write(&input, "Time,Amount\n0,1\n86400,2\n").unwrap();

    let err = commands::cmd_forecast(&config, &input, true, None).unwrap_err();
    assert!(format!("{:#}", err).contains("Insufficient history"));
}
