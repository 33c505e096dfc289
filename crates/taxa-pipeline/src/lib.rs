//! Taxa Pipeline
//!
//! Runs the stages of the municipal fee pipeline in order:
//!
//! 1. **Extract** (optional): document text to raw facts
//! 2. **Validate**: raw facts to scored records, one per municipality spelling
//! 3. **Deduplicate**: one record per canonical municipality key
//! 4. **Export**: CSV, XLSX, SQLite snapshot and statistics JSON
//!
//! Data-quality problems never fail a run. They come back as rejections and
//! counters on the [`PipelineResult`]; only a bad configuration or an
//! unreadable fact list is an error.

#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{parse_facts, Pipeline, PipelineResult, ProcessedBatch};
