//! Error types for ExpenseGuard

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Feature shape mismatch: expected {expected}, got {actual}")]
    FeatureShapeMismatch { expected: String, actual: String },

    #[error("Insufficient history: {days} distinct day(s) of data, at least {required} required")]
    InsufficientHistory { days: usize, required: usize },

    #[error("Could not parse upload: {0}")]
    UnstructuredInput(String),

    #[error("Invalid value in row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Forecast error: {0}")]
    Forecast(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used at the request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something we can name precisely (bad columns, bad values, short history)
    Rejected,
    /// The pipeline or one of its models failed
    Processing,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingColumns(_)
            | Self::InsufficientHistory { .. }
            | Self::UnstructuredInput(_)
            | Self::InvalidValue { .. } => ErrorKind::Rejected,
            _ => ErrorKind::Processing,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
