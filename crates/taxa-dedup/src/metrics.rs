//! Metrics collection for deduplication

/// Counters collected during deduplication
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupMetrics {
    /// Records received
    pub records_in: usize,

    /// Records emitted, one per municipality key
    pub records_out: usize,

    /// Records absorbed into another record of the same key
    pub duplicates_found: usize,

    /// Groups where a donor filled at least one missing field
    pub duplicates_merged: usize,

    /// Groups where the merged score beat the base record's score
    pub quality_upgrades: usize,

    /// Fields filled from donors
    pub fields_filled: usize,
}

impl DedupMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one group of records sharing a key
    pub fn record_group(&mut self, size: usize) {
        self.records_in += size;
        self.records_out += 1;
        self.duplicates_found += size.saturating_sub(1);
    }

    /// Record a group whose base gained fields
    pub fn record_merge(&mut self, fields_filled: usize) {
        self.duplicates_merged += 1;
        self.fields_filled += fields_filled;
    }

    /// Record a merge that raised the data quality score
    pub fn record_upgrade(&mut self) {
        self.quality_upgrades += 1;
    }

    /// Share of input records that were duplicates, in percent
    pub fn duplicate_rate(&self) -> f64 {
        taxa_domain::percentage(self.duplicates_found, self.records_in)
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Deduplication Summary".to_string(),
            "=====================".to_string(),
            format!("Records in: {}", self.records_in),
            format!("Records out: {}", self.records_out),
            format!(
                "Duplicates found: {} ({:.1}%)",
                self.duplicates_found,
                self.duplicate_rate()
            ),
        ];

        if self.duplicates_found > 0 {
            lines.push(format!("Duplicates merged: {}", self.duplicates_merged));
            lines.push(format!("Fields filled: {}", self.fields_filled));
            lines.push(format!("Quality upgrades: {}", self.quality_upgrades));
        }

        lines.join("\n")
    }
}
