//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `categorize` - Categorize descriptions and list the keyword table
//! - `score` - Fraud scoring and forecasting of local files
//! - `serve` - Web server command

pub mod categorize;
pub mod score;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use expenseguard_core::{ModelBundle, Pipeline, PipelineConfig};
use tracing::debug;

// Re-export command functions for main.rs
pub use categorize::*;
pub use score::*;
pub use serve::*;

/// Load the layered pipeline config, with `--models` taking precedence
pub fn load_config(config_path: Option<&Path>, model_dir: Option<&Path>) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(config_path).context("Failed to load pipeline config")?;
    if let Some(dir) = model_dir {
        config.model_dir = dir.to_path_buf();
    }
    debug!(
        model_dir = %config.model_dir.display(),
        match_mode = %config.match_mode,
        min_history_days = config.forecast.min_history_days,
        "Loaded pipeline config"
    );
    Ok(config)
}

/// Load models from the configured directory and build the pipeline
pub fn open_pipeline(config: &PipelineConfig) -> Result<Pipeline> {
    let models = ModelBundle::load(&config.model_dir, &config.forecast).with_context(|| {
        format!("Failed to load models from {}", config.model_dir.display())
    })?;
    Ok(Pipeline::new(models, config))
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
