//! Pipeline error types

use thiserror::Error;

/// Errors that can occur while setting up or feeding the pipeline
///
/// Bad facts never produce an error; they surface as rejections in the
/// [`crate::PipelineResult`].
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extractor setup error
    #[error("Extractor error: {0}")]
    Extractor(#[from] taxa_extractor::ExtractorError),

    /// Validation setup error
    #[error("Validation error: {0}")]
    Gatekeeper(#[from] taxa_gatekeeper::GatekeeperError),

    /// Deduplication setup error
    #[error("Deduplication error: {0}")]
    Dedup(#[from] taxa_dedup::DedupError),

    /// Export setup error
    #[error("Export error: {0}")]
    Export(#[from] taxa_export::ExportError),

    /// Fact list could not be parsed
    #[error("Invalid fact list: {0}")]
    Input(#[from] serde_json::Error),
}
