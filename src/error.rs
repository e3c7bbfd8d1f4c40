use thiserror::Error;

use crate::amount::ParseError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("No worksheet found in {0}")]
    NoWorksheet(String),

    #[error("Column '{column}' not found (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Row {line}: no value in column '{column}'")]
    MissingField { line: usize, column: String },

    #[error("Row {line}: column '{column}': {source}")]
    Field {
        line: usize,
        column: String,
        #[source]
        source: ParseError,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{failed} of {total} reports failed")]
    PartitionsFailed { failed: usize, total: usize },
}

pub type Result<T> = std::result::Result<T, ReportError>;
