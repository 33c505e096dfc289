//! Counters collected while validating a batch

use crate::validator::{FieldOutcome, RecordRejectionReason, RejectionKind};
use std::collections::BTreeMap;
use taxa_domain::{FieldName, MunicipalRecord, RecordStatus};

/// Validation counters
///
/// Passed explicitly into [`crate::Gatekeeper::validate_batch`] so several
/// batches can accumulate into one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationStats {
    /// Facts seen
    pub facts_processed: usize,

    /// Facts that passed their field rule
    pub facts_valid: usize,

    /// Facts that failed, per reason
    pub facts_rejected: BTreeMap<RejectionKind, usize>,

    /// Confidences that were clamped into [0, 1]
    pub confidences_clamped: usize,

    /// Records that reached the output
    pub records_built: usize,

    /// Output records with all three fields
    pub complete_records: usize,

    /// Output records with one or two fields
    pub partial_records: usize,

    /// Municipality groups dropped, per reason
    pub records_rejected: BTreeMap<RecordRejectionReason, usize>,

    /// Municipality names changed by cleaning
    pub names_normalized: usize,

    /// Output records populating each field
    pub field_coverage: BTreeMap<FieldName, usize>,
}

impl ValidationStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one fact
    pub fn record_fact(&mut self, outcome: &FieldOutcome) {
        self.facts_processed += 1;
        match outcome {
            FieldOutcome::Valid(_) => self.facts_valid += 1,
            FieldOutcome::Invalid(rejection) => {
                *self.facts_rejected.entry(rejection.kind).or_insert(0) += 1;
            }
        }
    }

    /// Record a fact that was skipped because its record was rejected
    pub fn record_skipped_fact(&mut self) {
        self.facts_processed += 1;
    }

    /// Record a clamped confidence
    pub fn record_clamp(&mut self) {
        self.confidences_clamped += 1;
    }

    /// Record a cleaned municipality name
    pub fn record_name_normalized(&mut self) {
        self.names_normalized += 1;
    }

    /// Record a record that reached the output
    pub fn record_built(&mut self, record: &MunicipalRecord) {
        self.records_built += 1;
        match record.status {
            RecordStatus::Complete => self.complete_records += 1,
            RecordStatus::Partial => self.partial_records += 1,
        }
        for field in record.populated_fields() {
            *self.field_coverage.entry(field).or_insert(0) += 1;
        }
    }

    /// Record a rejected municipality group
    pub fn record_rejection(&mut self, reason: RecordRejectionReason) {
        *self.records_rejected.entry(reason).or_insert(0) += 1;
    }

    /// Get total facts rejected across reasons
    pub fn total_facts_rejected(&self) -> usize {
        self.facts_rejected.values().sum()
    }

    /// Get total records rejected across reasons
    pub fn total_records_rejected(&self) -> usize {
        self.records_rejected.values().sum()
    }

    /// Reset all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Validation Summary".to_string(),
            "==================".to_string(),
            format!("Facts processed: {}", self.facts_processed),
            format!("Facts valid: {}", self.facts_valid),
            format!("Facts rejected: {}", self.total_facts_rejected()),
        ];

        for (kind, count) in &self.facts_rejected {
            lines.push(format!("  {}: {}", kind.as_str(), count));
        }

        if self.confidences_clamped > 0 {
            lines.push(format!("Confidences clamped: {}", self.confidences_clamped));
        }

        lines.push(String::new());
        lines.push(format!("Records built: {}", self.records_built));
        lines.push(format!("  complete: {}", self.complete_records));
        lines.push(format!("  partial: {}", self.partial_records));
        lines.push(format!("Records rejected: {}", self.total_records_rejected()));
        for (reason, count) in &self.records_rejected {
            lines.push(format!("  {}: {}", reason.as_str(), count));
        }
        lines.push(format!("Names normalized: {}", self.names_normalized));

        if !self.field_coverage.is_empty() {
            lines.push(String::new());
            lines.push("Field coverage:".to_string());
            for (field, count) in &self.field_coverage {
                lines.push(format!("  {}: {}", field, count));
            }
        }

        lines.join("\n")
    }
}
