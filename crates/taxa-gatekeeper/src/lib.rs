//! Taxa Gatekeeper
//!
//! The validation stage: turns raw facts into scored municipal records.
//!
//! The Gatekeeper provides:
//! - Per-field rules (integer bounds with a typical range, billing model synonyms)
//! - Municipality name cleaning and plausibility checks
//! - Conflict resolution when several sources give one field
//! - Completeness and data quality scoring
//!
//! # Examples
//!
//! ```
//! use taxa_domain::{FieldName, RawFact, SourceType};
//! use taxa_gatekeeper::{Gatekeeper, ValidationConfig, ValidationStats};
//!
//! let gatekeeper = Gatekeeper::new(ValidationConfig::default());
//! let facts = vec![RawFact::new(
//!     "Ale kommun",
//!     FieldName::FoodControlRate,
//!     1250i64,
//!     0.9,
//!     "https://www.ale.se/taxa",
//!     SourceType::Html,
//! )];
//!
//! let mut stats = ValidationStats::new();
//! let batch = gatekeeper.validate_batch(&facts, &mut stats);
//! assert_eq!(batch.records[0].municipality, "Ale");
//! assert_eq!(batch.records[0].food_control_rate, Some(1250));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod scorer;
mod stats;
mod validator;

pub use config::{EnumRule, FieldRule, NumericRule, ScoreWeights, ValidationConfig};
pub use error::GatekeeperError;
pub use scorer::{looks_municipal, source_reliability, QualityScorer};
pub use stats::ValidationStats;
pub use validator::{
    coerce_integer, match_billing, FieldOutcome, FieldRejection, Gatekeeper, NormalizedValue,
    RecordRejection, RecordRejectionReason, RejectionKind, ValidatedField, ValidationBatch,
};
