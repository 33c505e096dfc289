//! Concurrent export of one record set

use crate::statistics::StatisticsDocument;
use crate::{writers, ExportConfig, ExportError, ExportFormat};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use taxa_domain::{AggregateStatistics, MunicipalRecord, RunId};
use tracing::{error, info, warn};

/// Result of writing one format
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    /// Format written
    pub format: ExportFormat,
    /// Artifact path
    pub path: PathBuf,
    /// Failure message, `None` on success
    pub error: Option<String>,
}

impl ExportOutcome {
    /// Whether the artifact was written
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// What one export run produced
#[derive(Debug, Clone, PartialEq)]
pub struct ExportManifest {
    /// Run id shared by every artifact
    pub run_id: RunId,
    /// Run timestamp (`%Y%m%d_%H%M%S`, UTC)
    pub timestamp: String,
    /// Records exported
    pub record_count: usize,
    /// One outcome per enabled format, in format order
    pub outcomes: Vec<ExportOutcome>,
}

impl ExportManifest {
    /// Formats that were written
    pub fn succeeded(&self) -> Vec<&ExportOutcome> {
        self.outcomes.iter().filter(|o| o.is_success()).collect()
    }

    /// Formats that failed
    pub fn failed(&self) -> Vec<&ExportOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success()).collect()
    }

    /// Whether every enabled format was written
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(ExportOutcome::is_success)
    }

    /// Artifact path of a format, if it was written
    pub fn path(&self, format: ExportFormat) -> Option<&PathBuf> {
        self.outcomes
            .iter()
            .find(|o| o.format == format && o.is_success())
            .map(|o| &o.path)
    }
}

/// Writes a final record set in every enabled format
///
/// # Examples
///
/// ```no_run
/// use taxa_export::{ExportConfig, Exporter};
///
/// # async fn run() {
/// let exporter = Exporter::new(ExportConfig::in_dir("output"));
/// let manifest = exporter.export(&[]).await;
/// assert!(manifest.is_complete());
/// # }
/// ```
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an Exporter with the given configuration
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an Exporter, rejecting an invalid configuration
    pub fn try_new(config: ExportConfig) -> Result<Self, ExportError> {
        config.validate().map_err(ExportError::Config)?;
        Ok(Self::new(config))
    }

    /// The active configuration
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export under a fresh run id and the current UTC time
    pub async fn export(&self, records: &[MunicipalRecord]) -> ExportManifest {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        self.export_as(records, RunId::new(), timestamp).await
    }

    /// Export under a given run id and timestamp
    ///
    /// Formats are written concurrently. A failing or panicking writer is
    /// recorded in the manifest and does not stop the others.
    pub async fn export_as(
        &self,
        records: &[MunicipalRecord],
        run_id: RunId,
        timestamp: String,
    ) -> ExportManifest {
        let formats = self.config.enabled_formats();
        let mut manifest = ExportManifest {
            run_id,
            timestamp: timestamp.clone(),
            record_count: records.len(),
            outcomes: Vec::with_capacity(formats.len()),
        };

        if records.is_empty() {
            warn!("Exporting an empty record set");
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.config.output_dir).await {
            error!(
                "Failed to create output directory {}: {}",
                self.config.output_dir.display(),
                e
            );
            let message = ExportError::Io(e).to_string();
            for format in formats {
                manifest.outcomes.push(ExportOutcome {
                    format,
                    path: self.config.path_for(format, &timestamp),
                    error: Some(message.clone()),
                });
            }
            return manifest;
        }

        let records: Arc<[MunicipalRecord]> = records.into();
        let statistics = Arc::new(AggregateStatistics::from_records(&records));
        let pretty = self.config.pretty_json;

        let mut handles = Vec::with_capacity(formats.len());
        for format in formats {
            let path = self.config.path_for(format, &timestamp);
            let records = Arc::clone(&records);
            let statistics = Arc::clone(&statistics);
            let timestamp = timestamp.clone();
            let target = path.clone();

            let handle = tokio::task::spawn_blocking(move || match format {
                ExportFormat::Csv => writers::write_csv(&target, &records),
                ExportFormat::Xlsx => writers::write_xlsx(&target, &records, &statistics),
                ExportFormat::Sqlite => {
                    writers::write_sqlite(&target, &records, &statistics, run_id, &timestamp)
                }
                ExportFormat::StatisticsJson => {
                    let document =
                        StatisticsDocument::new(&statistics, &run_id.to_string(), &timestamp);
                    writers::write_statistics(&target, &document, pretty)
                }
            });
            handles.push((format, path, handle));
        }

        for (format, path, handle) in handles {
            let result = handle
                .await
                .map_err(|e| ExportError::Task(e.to_string()))
                .and_then(|written| written);

            let error = match result {
                Ok(()) => {
                    info!("Exported {} to {}", format, path.display());
                    None
                }
                Err(e) => {
                    error!("Export of {} to {} failed: {}", format, path.display(), e);
                    Some(e.to_string())
                }
            };
            manifest.outcomes.push(ExportOutcome {
                format,
                path,
                error,
            });
        }

        info!(
            "Export run {} finished: {}/{} formats written",
            manifest.run_id,
            manifest.succeeded().len(),
            manifest.outcomes.len()
        );

        manifest
    }
}
