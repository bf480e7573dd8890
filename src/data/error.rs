use std::path::PathBuf;

/// Errors raised while loading the sale dataset.
///
/// Any of these aborts startup: a dataset is either loaded completely or not
/// at all.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Unsupported file extension: .{extension} ({path})")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// Unparseable or missing sale date.
    #[error("Row {row}: cannot parse sale date '{value}'")]
    Date { row: usize, value: String },

    #[error("Row {row}, column '{column}': '{value}' is not a number")]
    Number {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

pub type Result<T> = std::result::Result<T, LoadError>;
