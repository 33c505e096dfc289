//! Taxa Domain Layer
//!
//! This crate contains the data model shared by every stage of the municipal
//! fee pipeline. It has no infrastructure dependencies and defines the
//! value objects, the canonical municipality key, and the trait interface
//! for the relational snapshot.
//!
//! ## Key Concepts
//!
//! - **RawFact**: One candidate field value pulled from a document, with provenance
//! - **MunicipalRecord**: The per-municipality accumulation of validated facts
//! - **MunicipalityKey**: Normalized name used to group duplicate records
//! - **QualityBucket**: Reporting band for the 0-100 data quality score
//! - **AggregateStatistics**: Coverage and value summary of a final record set
//!
//! ## The three target fields
//!
//! | Field | Identifier | Type |
//! |-------|------------|------|
//! | Food-control hourly rate | `timtaxa_livsmedel` | integer (kr/hour) |
//! | Food-control billing model | `debitering_livsmedel` | `förskott` or `efterhand` |
//! | Building-permit hourly rate | `timtaxa_bygglov` | integer (kr/hour) |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fact;
pub mod field;
pub mod municipality;
pub mod quality;
pub mod record;
pub mod run;
pub mod statistics;
pub mod traits;

// Re-exports for convenience
pub use fact::{RawFact, SourceType};
pub use field::{BillingModel, FieldName, FieldValue, QualityFlag};
pub use municipality::{clean_municipality_name, MunicipalityKey};
pub use quality::QualityBucket;
pub use record::{Evidence, MunicipalRecord, RecordStatus};
pub use run::RunId;
pub use statistics::{
    percentage, AggregateStatistics, BillingDistribution, FieldCoverage, NumericSummary,
    QualityHistogram,
};
pub use traits::{RecordQuery, RecordStore};
