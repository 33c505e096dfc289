//! Completeness and data quality scoring
//!
//! The scorer only reads a record's fields and evidence, so the
//! deduplication stage reuses it to rescore merged records.

use crate::config::ScoreWeights;
use taxa_domain::{FieldName, MunicipalRecord, QualityFlag, SourceType};

/// Host part of a URL, lower-cased
fn host(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    rest.split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('@')
        .next()
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Whether a URL's host looks like a Swedish municipality site
pub fn looks_municipal(url: &str) -> bool {
    let host = host(url);
    host.ends_with(".se") || host.contains("kommun") || host.contains("stad")
}

/// Reliability of one source in [0, 1]
///
/// PDF 0.6, HTML 0.5, plus 0.2 for a `.se` host and 0.2 for a host that
/// mentions `kommun` or `stad`.
pub fn source_reliability(source_type: SourceType, url: &str) -> f64 {
    let host = host(url);
    let mut score = match source_type {
        SourceType::Pdf => 0.6,
        SourceType::Html => 0.5,
    };
    if host.ends_with(".se") {
        score += 0.2;
    }
    if host.contains("kommun") || host.contains("stad") {
        score += 0.2;
    }
    f64::min(score, 1.0)
}

const LOW_CONFIDENCE_WARNING: &str = "low average confidence: ";
const NON_MUNICIPAL_WARNING: &str = "source URL does not look municipal: ";

/// Computes completeness, the composite data quality score and the
/// record-level quality warnings
#[derive(Debug, Clone)]
pub struct QualityScorer {
    weights: ScoreWeights,
    low_confidence_threshold: f64,
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl QualityScorer {
    /// Create a scorer with the given weights and a 0.5 confidence threshold
    pub fn new(weights: ScoreWeights) -> Self {
        Self {
            weights,
            low_confidence_threshold: 0.5,
        }
    }

    /// Set the mean confidence below which a record gets a warning
    pub fn with_low_confidence_threshold(mut self, threshold: f64) -> Self {
        self.low_confidence_threshold = threshold;
        self
    }

    /// The configured weights
    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// The configured confidence threshold
    pub fn low_confidence_threshold(&self) -> f64 {
        self.low_confidence_threshold
    }

    /// Replace the confidence and source warnings with ones matching the
    /// record's current evidence and sources
    ///
    /// Other warnings are left untouched.
    pub fn refresh_warnings(&self, record: &mut MunicipalRecord) {
        record.validation_warnings.retain(|w| {
            !w.starts_with(LOW_CONFIDENCE_WARNING) && !w.starts_with(NON_MUNICIPAL_WARNING)
        });

        let average = record.average_confidence();
        if average < self.low_confidence_threshold {
            record
                .validation_warnings
                .push(format!("{}{:.2}", LOW_CONFIDENCE_WARNING, average));
        }

        let suspicious: Vec<String> = record
            .source_urls
            .iter()
            .filter(|url| !looks_municipal(url))
            .map(|url| format!("{}{}", NON_MUNICIPAL_WARNING, url))
            .collect();
        record.validation_warnings.extend(suspicious);
    }

    /// Mean source reliability over populated fields
    pub fn record_source_reliability(&self, record: &MunicipalRecord) -> f64 {
        let scores: Vec<f64> = record
            .populated_fields()
            .into_iter()
            .filter_map(|f| record.evidence.get(&f))
            .map(|e| source_reliability(e.source_type, &e.source_url))
            .collect();
        mean(&scores)
    }

    /// Mean typicality over populated fields
    ///
    /// Typical rates and billing models count 1.0, flagged rates 0.5.
    pub fn typicality(&self, record: &MunicipalRecord) -> f64 {
        let scores: Vec<f64> = record
            .populated_fields()
            .into_iter()
            .map(|field| match field {
                FieldName::FoodControlBilling => 1.0,
                _ => match record.rate_flag(field) {
                    Some(QualityFlag::Low) | Some(QualityFlag::High) => 0.5,
                    _ => 1.0,
                },
            })
            .collect();
        mean(&scores)
    }

    /// Composite data quality score in [0, 100]
    pub fn data_quality(&self, record: &MunicipalRecord) -> f64 {
        let completeness = record.populated_count() as f64 / FieldName::COUNT as f64;
        let w = &self.weights;
        let raw = w.confidence * record.average_confidence()
            + w.completeness * completeness
            + w.source_reliability * self.record_source_reliability(record)
            + w.typicality * self.typicality(record);
        (raw * 100.0).clamp(0.0, 100.0)
    }

    /// Recompute completeness, status and data quality in place
    pub fn apply(&self, record: &mut MunicipalRecord) {
        record.refresh_completeness();
        record.data_quality_score = self.data_quality(record);
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
