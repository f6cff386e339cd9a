use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a [`Dataset`](super::model::Dataset) at startup.
///
/// Every variant is fatal: the input is a static file, so retrying cannot help.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("reading data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}
