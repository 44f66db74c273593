//! Error types for the ismip-hom pipeline.
//!
//! Failures that belong to a single data file (`Parse`, `Load`,
//! `Interpolation`) are collected per record by the pipeline and never
//! abort the batch. Unknown models, out-of-hull grid cells and empty
//! aggregation groups are not errors at all and have no variant here.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ismip-hom operations.
#[derive(Error, Debug)]
pub enum IsmipError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The file name does not follow the `MMMMELLL` convention
    #[error("Cannot parse data file name {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Malformed numeric content or a column count the experiment does not allow
    #[error("Failed to load {path:?} (line {line}): {message}")]
    Load {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The scattered samples cannot be triangulated
    #[error("Interpolation error: {message}")]
    Interpolation { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Directory traversal errors during discovery
    #[error("Discovery error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Delimited table writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Export errors
    #[error("Export error: {message}")]
    Export { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IsmipError {
    /// Short machine-readable name of the variant, used in logs and the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            IsmipError::Io(_) => "io",
            IsmipError::Config { .. } => "config",
            IsmipError::Parse { .. } => "parse",
            IsmipError::Load { .. } => "load",
            IsmipError::Interpolation { .. } => "interpolation",
            IsmipError::InvalidParameter { .. } => "invalid_parameter",
            IsmipError::Walk(_) => "walk",
            IsmipError::Csv(_) => "csv",
            IsmipError::Export { .. } => "export",
            IsmipError::Json(_) => "json",
        }
    }
}

/// Convenience type alias for Results with IsmipError
pub type Result<T> = std::result::Result<T, IsmipError>;
