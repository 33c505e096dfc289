//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur while setting up validation
///
/// Bad input data never produces an error; it is reported through
/// `FieldOutcome` and `RecordRejection` instead.
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A field rule is inconsistent
    #[error("Invalid rule for {field}: {reason}")]
    InvalidRule {
        /// Field the rule belongs to
        field: String,
        /// What is wrong with it
        reason: String,
    },
}
