//! Taxa Export
//!
//! Writes the final record set of a run as:
//!
//! - `<prefix>_<timestamp>.csv`: one row per municipality
//! - `<prefix>_<timestamp>.xlsx`: `Records`, `Summary` and `Missing Data` sheets
//! - `<prefix>_<timestamp>.db`: SQLite snapshot (see taxa-store)
//! - `<prefix>_statistics_<timestamp>.json`: `summary`, `field_coverage`,
//!   `quality_distribution` and `value_analysis` sections
//!
//! Every artifact of a run shares one [`taxa_domain::RunId`] and one
//! timestamp. Formats are written concurrently on the blocking pool, and the
//! outcome of each is reported in an [`ExportManifest`].
//!
//! # Examples
//!
//! ```no_run
//! use taxa_export::{ExportConfig, Exporter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let exporter = Exporter::new(ExportConfig::in_dir("output"));
//!     let manifest = exporter.export(&[]).await;
//!     for outcome in manifest.failed() {
//!         eprintln!("{} failed: {:?}", outcome.format, outcome.error);
//!     }
//! }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod exporter;
pub mod rows;
mod statistics;
mod writers;

pub use config::{ExportConfig, ExportFormat};
pub use error::ExportError;
pub use exporter::{ExportManifest, ExportOutcome, Exporter};
pub use statistics::{BucketEntry, CoverageEntry, StatisticsDocument, SummarySection, ValueAnalysis};
