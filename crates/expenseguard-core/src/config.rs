//! Pipeline configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded in three layers:
//! 1. Embedded defaults (compiled into binary from `config/pipeline.toml`)
//! 2. Override file: an explicit path, else
//!    `~/.local/share/expenseguard/config/pipeline.toml` when it exists
//! 3. `EXPENSEGUARD_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pipeline.toml");

/// How category keywords are compared against descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Keyword must equal one description word
    #[default]
    Token,
    /// Keyword words must appear contiguously in the description
    Phrase,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Phrase => "phrase",
        }
    }
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "token" => Ok(Self::Token),
            "phrase" | "substring" => Ok(Self::Phrase),
            _ => Err(format!("Unknown match mode: {}", s)),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forecast path settings
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub min_history_days: usize,
    pub horizon_days: u32,
    pub interval_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_history_days: 10,
            horizon_days: 30,
            interval_width: 0.80,
        }
    }
}

/// Request bounds applied by the HTTP server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerLimits {
    pub max_upload_bytes: usize,
    pub forecast_timeout: Duration,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            forecast_timeout: Duration::from_secs(30),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub model_dir: PathBuf,
    pub match_mode: MatchMode,
    pub forecast: ForecastConfig,
    pub server: ServerLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            match_mode: MatchMode::Token,
            forecast: ForecastConfig::default(),
            server: ServerLimits::default(),
        }
    }
}

impl PipelineConfig {
    /// Load config (override file first, then embedded default), then apply environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = load_config(override_path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse config from TOML content, starting from defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Apply `EXPENSEGUARD_*` overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("EXPENSEGUARD_MODEL_DIR").filter(|s| !s.is_empty()) {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(mode) = lookup("EXPENSEGUARD_MATCH_MODE").filter(|s| !s.is_empty()) {
            self.match_mode = mode.parse().map_err(Error::Config)?;
        }
        if let Some(days) = lookup("EXPENSEGUARD_MIN_HISTORY_DAYS").filter(|s| !s.is_empty()) {
            self.forecast.min_history_days = days.trim().parse().map_err(|_| {
                Error::Config(format!("Invalid EXPENSEGUARD_MIN_HISTORY_DAYS: {}", days))
            })?;
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| {
        d.join("expenseguard")
            .join("config")
            .join("pipeline.toml")
    })
}

/// Load configuration (override first, then default)
///
/// An explicit path must exist; the per-user default path is optional.
fn load_config(override_path: Option<&Path>) -> Result<PipelineConfig> {
    let path = match override_path {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let content = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading pipeline config override");
            fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    models: Option<RawModels>,
    categorization: Option<RawCategorization>,
    forecast: Option<RawForecast>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawModels {
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawCategorization {
    match_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    min_history_days: Option<usize>,
    horizon_days: Option<u32>,
    interval_width: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    max_upload_bytes: Option<usize>,
    forecast_timeout_secs: Option<u64>,
}

fn parse_config(content: &str) -> Result<PipelineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = PipelineConfig::default();

    if let Some(dir) = raw.models.and_then(|m| m.dir) {
        config.model_dir = dir;
    }

    if let Some(mode) = raw.categorization.and_then(|c| c.match_mode) {
        config.match_mode = mode.parse().map_err(Error::Config)?;
    }

    if let Some(forecast) = raw.forecast {
        if let Some(days) = forecast.min_history_days {
            config.forecast.min_history_days = days;
        }
        if let Some(horizon) = forecast.horizon_days {
            config.forecast.horizon_days = horizon;
        }
        if let Some(width) = forecast.interval_width {
            if !(width > 0.0 && width < 1.0) {
                return Err(Error::Config(format!(
                    "forecast.interval_width must be between 0 and 1, got {}",
                    width
                )));
            }
            config.forecast.interval_width = width;
        }
    }

    if let Some(server) = raw.server {
        if let Some(bytes) = server.max_upload_bytes {
            config.server.max_upload_bytes = bytes;
        }
        if let Some(secs) = server.forecast_timeout_secs {
            config.server.forecast_timeout = Duration::from_secs(secs);
        }
    }

    Ok(config)
}
