//! Taxa Deduplication
//!
//! Collapses records that describe the same municipality into one record.
//!
//! # Overview
//!
//! Records are grouped by [`taxa_domain::MunicipalityKey`], the same key the
//! validation stage cleans names with, so "Stockholm kommun" and "stockholm"
//! land in one group. Within a group:
//!
//! 1. Every candidate gets a weighted score
//!    (completeness, data quality, mean confidence, source reliability).
//! 2. The best candidate becomes the base. Ties are broken on the record's
//!    content, so the result never depends on input order.
//! 3. The remaining candidates, best first, fill fields the base is missing.
//!    A populated field is never overwritten.
//! 4. The merged record is rescored.
//!
//! Groups of one pass through unchanged, which makes a second run a no-op.
//!
//! # Usage
//!
//! ```
//! use taxa_dedup::{DedupConfig, DedupMetrics, Deduplicator};
//! use taxa_gatekeeper::QualityScorer;
//!
//! let dedup = Deduplicator::new(DedupConfig::default(), QualityScorer::default());
//! let mut metrics = DedupMetrics::new();
//! let records = dedup.dedupe(Vec::new(), &mut metrics);
//!
//! assert!(records.is_empty());
//! println!("{}", metrics.summary());
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [dedup]
//! gap_fill = true
//!
//! [dedup.weights]
//! completeness = 0.4
//! data_quality = 0.3
//! confidence = 0.2
//! source_reliability = 0.1
//! ```

#![warn(missing_docs)]

mod config;
mod deduplicator;
mod error;
mod metrics;

pub use config::{DedupConfig, DedupWeights};
pub use deduplicator::Deduplicator;
pub use error::DedupError;
pub use metrics::DedupMetrics;
