//! Stage wiring: Extractor -> Validation -> Deduplication -> Export

use crate::{PipelineConfig, PipelineError};
use taxa_dedup::{DedupMetrics, Deduplicator};
use taxa_domain::{AggregateStatistics, MunicipalRecord, RawFact};
use taxa_export::{ExportManifest, Exporter};
use taxa_extractor::{Document, FactExtractor};
use taxa_gatekeeper::{FieldRejection, Gatekeeper, RecordRejection, ValidationStats};
use tracing::{info, warn};

/// Parse the upstream fact list (a JSON array of facts)
pub fn parse_facts(json: &str) -> Result<Vec<RawFact>, PipelineError> {
    Ok(serde_json::from_str(json)?)
}

/// Output of validation and deduplication, before export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedBatch {
    /// Facts received
    pub input_facts: usize,
    /// Final records, one per municipality, sorted by key
    pub records: Vec<MunicipalRecord>,
    /// Validation counters
    pub validation: ValidationStats,
    /// Deduplication counters
    pub dedup: DedupMetrics,
    /// Municipality groups dropped by validation
    pub rejections: Vec<RecordRejection>,
    /// Individual facts that failed their field rule
    pub field_rejections: Vec<FieldRejection>,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Facts received
    pub input_facts: usize,
    /// Final records
    pub records: Vec<MunicipalRecord>,
    /// Aggregate statistics of the final records
    pub statistics: AggregateStatistics,
    /// Validation counters
    pub validation: ValidationStats,
    /// Deduplication counters
    pub dedup: DedupMetrics,
    /// Municipality groups dropped by validation
    pub rejections: Vec<RecordRejection>,
    /// Individual facts that failed their field rule
    pub field_rejections: Vec<FieldRejection>,
    /// Export outcomes
    pub manifest: ExportManifest,
}

impl PipelineResult {
    /// Whether the run received no facts at all
    pub fn is_empty_input(&self) -> bool {
        self.input_facts == 0
    }

    /// Generate a summary report of the run
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Pipeline Summary".to_string(),
            "================".to_string(),
            format!("Run: {} ({})", self.manifest.run_id, self.manifest.timestamp),
            format!("Facts in: {}", self.input_facts),
            format!(
                "Records out: {} ({} complete, {} partial)",
                self.statistics.total_records,
                self.statistics.complete_records,
                self.statistics.partial_records
            ),
            format!("Records rejected: {}", self.rejections.len()),
            format!("Facts rejected: {}", self.field_rejections.len()),
            format!("Duplicates found: {}", self.dedup.duplicates_found),
            format!(
                "Average data quality: {:.1}",
                self.statistics.average_data_quality
            ),
            String::new(),
        ];

        for outcome in &self.manifest.outcomes {
            match &outcome.error {
                None => lines.push(format!("  {}: {}", outcome.format, outcome.path.display())),
                Some(e) => lines.push(format!("  {}: FAILED ({})", outcome.format, e)),
            }
        }

        lines.join("\n")
    }
}

/// The assembled pipeline
///
/// # Examples
///
/// ```no_run
/// use taxa_pipeline::{Pipeline, PipelineConfig};
///
/// # async fn run() -> Result<(), taxa_pipeline::PipelineError> {
/// let pipeline = Pipeline::new(PipelineConfig::default())?;
/// let facts = taxa_pipeline::parse_facts(
///     r#"[{"municipality": "Ale", "field_name": "timtaxa_bygglov", "value": 1100,
///          "confidence": 0.8, "source_url": "https://www.ale.se/taxa", "source_type": "HTML"}]"#,
/// )?;
/// let result = pipeline.run(&facts).await;
/// println!("{}", result.summary());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    extractor: FactExtractor,
    gatekeeper: Gatekeeper,
    deduplicator: Deduplicator,
    exporter: Exporter,
}

impl Pipeline {
    /// Validate the configuration and build every stage
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;

        let extractor = FactExtractor::new(config.extractor.clone())?;
        let gatekeeper = Gatekeeper::try_new(config.validation.clone())?;
        let deduplicator = Deduplicator::try_new(config.dedup.clone(), gatekeeper.scorer().clone())?;
        let exporter = Exporter::try_new(config.export.clone())?;

        Ok(Self {
            config,
            extractor,
            gatekeeper,
            deduplicator,
            exporter,
        })
    }

    /// Create a Pipeline with default configuration
    pub fn default_config() -> Result<Self, PipelineError> {
        Self::new(PipelineConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Pull facts out of documents
    pub fn extract(&self, documents: &[Document]) -> Vec<RawFact> {
        let facts = self.extractor.extract_all(documents);
        info!(
            "Extracted {} facts from {} documents",
            facts.len(),
            documents.len()
        );
        facts
    }

    /// Validate and deduplicate a fact list
    pub fn process(&self, facts: &[RawFact]) -> ProcessedBatch {
        if facts.is_empty() {
            warn!("Pipeline received no facts");
        }

        let mut validation = ValidationStats::new();
        let batch = self.gatekeeper.validate_batch(facts, &mut validation);

        let mut dedup = DedupMetrics::new();
        let records = self.deduplicator.dedupe(batch.records, &mut dedup);

        ProcessedBatch {
            input_facts: facts.len(),
            records,
            validation,
            dedup,
            rejections: batch.rejections,
            field_rejections: batch.field_rejections,
        }
    }

    /// Validate, deduplicate and export a fact list
    pub async fn run(&self, facts: &[RawFact]) -> PipelineResult {
        let processed = self.process(facts);
        let statistics = AggregateStatistics::from_records(&processed.records);
        let manifest = self.exporter.export(&processed.records).await;

        info!(
            "Pipeline finished: {} facts -> {} records, completion rate {:.1}%",
            processed.input_facts, statistics.total_records, statistics.completion_rate
        );

        PipelineResult {
            input_facts: processed.input_facts,
            records: processed.records,
            statistics,
            validation: processed.validation,
            dedup: processed.dedup,
            rejections: processed.rejections,
            field_rejections: processed.field_rejections,
            manifest,
        }
    }

    /// Extract from documents, then run the rest of the pipeline
    pub async fn run_documents(&self, documents: &[Document]) -> PipelineResult {
        let facts = self.extract(documents);
        self.run(&facts).await
    }
}
