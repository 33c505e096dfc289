//! Export error types

use thiserror::Error;

/// Errors raised while writing one export format
///
/// A failing format never aborts the run; the error is recorded in the
/// [`crate::ExportManifest`] as text.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook writer error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Statistics document could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Relational snapshot error
    #[error("Snapshot error: {0}")]
    Store(#[from] taxa_store::StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The writer task did not finish
    #[error("Writer task failed: {0}")]
    Task(String),
}
