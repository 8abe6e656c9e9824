use thiserror::Error;

#[derive(Error, Debug)]
pub enum VpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Worksheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Header row {row} is past the end of the sheet ({rows} rows)")]
    HeaderRowOutOfRange { row: usize, rows: usize },

    #[error("Column '{0}' was not found")]
    MissingRequiredField(String),

    #[error("Unit column at position {index} is missing (table has {width} columns)")]
    MissingUnitColumn { index: usize, width: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, VpError>;
