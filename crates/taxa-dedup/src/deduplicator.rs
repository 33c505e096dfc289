//! Grouping, candidate competition and gap-filling merge

use crate::{DedupConfig, DedupError, DedupMetrics};
use std::collections::BTreeMap;
use taxa_domain::{clean_municipality_name, FieldName, MunicipalRecord, MunicipalityKey};
use taxa_gatekeeper::QualityScorer;
use tracing::{debug, info};

/// Collapses records that share a municipality key into one record each
///
/// Within a group the highest scoring candidate becomes the base; the
/// others donate values only for fields the base is missing. Output is
/// sorted by key and does not depend on input order.
///
/// # Examples
///
/// ```
/// use taxa_dedup::{DedupMetrics, Deduplicator};
/// use taxa_domain::MunicipalRecord;
///
/// let dedup = Deduplicator::default_config();
/// let records = vec![MunicipalRecord::new("Stockholm"), MunicipalRecord::new("Stockholm kommun")];
///
/// let mut metrics = DedupMetrics::new();
/// let out = dedup.dedupe(records, &mut metrics);
/// assert_eq!(out.len(), 1);
/// assert_eq!(metrics.duplicates_found, 1);
/// ```
pub struct Deduplicator {
    config: DedupConfig,
    scorer: QualityScorer,
}

impl Deduplicator {
    /// Create a Deduplicator that rescores merged records with `scorer`
    pub fn new(config: DedupConfig, scorer: QualityScorer) -> Self {
        Self { config, scorer }
    }

    /// Create a Deduplicator, rejecting an invalid configuration
    pub fn try_new(config: DedupConfig, scorer: QualityScorer) -> Result<Self, DedupError> {
        config.validate().map_err(DedupError::Config)?;
        Ok(Self::new(config, scorer))
    }

    /// Create a Deduplicator with default configuration and scorer
    pub fn default_config() -> Self {
        Self::new(DedupConfig::default(), QualityScorer::default())
    }

    /// The active configuration
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Candidate score in [0, 1]
    pub fn candidate_score(&self, record: &MunicipalRecord) -> f64 {
        let w = &self.config.weights;
        w.completeness * record.completeness_score
            + w.data_quality * record.data_quality_score / 100.0
            + w.confidence * record.average_confidence()
            + w.source_reliability * self.scorer.record_source_reliability(record)
    }

    /// Collapse duplicates, one output record per municipality key
    pub fn dedupe(
        &self,
        records: Vec<MunicipalRecord>,
        metrics: &mut DedupMetrics,
    ) -> Vec<MunicipalRecord> {
        let mut groups: BTreeMap<MunicipalityKey, Vec<MunicipalRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry(MunicipalityKey::from_name(&record.municipality))
                .or_default()
                .push(record);
        }

        let mut output = Vec::with_capacity(groups.len());
        for (key, group) in groups {
            metrics.record_group(group.len());
            output.push(self.resolve_group(&key, group, metrics));
        }

        info!(
            "Deduplication kept {} of {} records ({} duplicates)",
            metrics.records_out, metrics.records_in, metrics.duplicates_found
        );

        output
    }

    fn resolve_group(
        &self,
        key: &MunicipalityKey,
        mut group: Vec<MunicipalRecord>,
        metrics: &mut DedupMetrics,
    ) -> MunicipalRecord {
        if group.len() == 1 {
            let mut record = group.remove(0);
            record.municipality = clean_municipality_name(&record.municipality);
            return record;
        }

        let mut ranked: Vec<(f64, String, MunicipalRecord)> = group
            .into_iter()
            .map(|r| (self.candidate_score(&r), canonical_text(&r), r))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        if ranked[0].0 == ranked[1].0 {
            debug!(
                "Tie at score {:.3} for '{}', broken on record content",
                ranked[0].0, key
            );
        }

        let (_, _, mut base) = ranked.remove(0);
        base.municipality = clean_municipality_name(&base.municipality);

        if !self.config.gap_fill {
            return base;
        }

        let base_score = base.data_quality_score;
        let mut filled = 0;
        for (_, _, donor) in ranked {
            let mut donated = false;
            for field in FieldName::ALL {
                if base.copy_field_from(&donor, field) {
                    debug!(
                        "Filled {} for '{}' from {}",
                        field,
                        base.municipality,
                        donor.joined_source_urls()
                    );
                    filled += 1;
                    donated = true;
                }
            }
            if donated {
                for warning in donor.validation_warnings {
                    if !base.validation_warnings.contains(&warning) {
                        base.validation_warnings.push(warning);
                    }
                }
            }
        }

        if filled > 0 {
            self.scorer.apply(&mut base);
            self.scorer.refresh_warnings(&mut base);
            metrics.record_merge(filled);
            if base.data_quality_score > base_score {
                metrics.record_upgrade();
            }
            info!(
                "Merged {} field(s) into '{}' (quality {:.1} -> {:.1})",
                filled, base.municipality, base_score, base.data_quality_score
            );
        }

        base
    }
}

/// Stable text form of a record, used as the final tie-break
///
/// Every field, set and map in the record serializes in a fixed order.
fn canonical_text(record: &MunicipalRecord) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| record.municipality.clone())
}
