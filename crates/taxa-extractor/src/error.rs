//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur while building an extractor
///
/// Extraction itself never fails; a document without matches simply
/// yields no facts.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// A configured pattern does not compile or has no capture group
    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern {
        /// Pattern source
        pattern: String,
        /// Why it was refused
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
