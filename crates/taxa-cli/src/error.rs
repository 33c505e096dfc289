//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] taxa_pipeline::PipelineError),

    /// Snapshot error
    #[error("Snapshot error: {0}")]
    Store(#[from] taxa_store::StoreError),

    /// Extractor error
    #[error("Extractor error: {0}")]
    Extractor(#[from] taxa_extractor::ExtractorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Some export formats failed
    #[error("{0} export format(s) failed")]
    ExportIncomplete(usize),
}
