//! Trait definitions for external interactions
//!
//! The relational snapshot is the only infrastructure the pipeline talks to
//! through a trait; the implementation lives in taxa-store.

use crate::field::FieldName;
use crate::record::{MunicipalRecord, RecordStatus};
use crate::run::RunId;
use crate::statistics::AggregateStatistics;

/// Trait for persisting and reading back municipal records
///
/// Implemented by the infrastructure layer (taxa-store)
pub trait RecordStore {
    /// Error type for store operations
    type Error;

    /// Save a record set, replacing any record with the same name
    fn save_records(&mut self, records: &[MunicipalRecord]) -> Result<usize, Self::Error>;

    /// Get a record by municipality name (exact, case-insensitive)
    fn get_record(&self, municipality: &str) -> Result<Option<MunicipalRecord>, Self::Error>;

    /// Query records matching criteria
    fn query_records(&self, query: &RecordQuery) -> Result<Vec<MunicipalRecord>, Self::Error>;

    /// Save the aggregate statistics of an export run
    fn save_statistics(
        &mut self,
        run_id: RunId,
        timestamp: &str,
        statistics: &AggregateStatistics,
    ) -> Result<(), Self::Error>;
}

/// Query criteria for retrieving records
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Filter by substring of the municipality name (case-insensitive)
    pub name_contains: Option<String>,

    /// Filter by status
    pub status: Option<RecordStatus>,

    /// Filter by minimum data quality score
    pub min_quality: Option<f64>,

    /// Only records missing this field
    pub missing_field: Option<FieldName>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// Whether a record satisfies the filters (ignores `limit`)
    pub fn matches(&self, record: &MunicipalRecord) -> bool {
        if let Some(needle) = &self.name_contains {
            if !record
                .municipality
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(min) = self.min_quality {
            if record.data_quality_score < min {
                return false;
            }
        }
        if let Some(field) = self.missing_field {
            if record.is_populated(field) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::QualityFlag;

    #[test]
    fn test_query_matches() {
        let mut record = MunicipalRecord::new("Upplands Väsby");
        record.set_rate(FieldName::FoodControlRate, 1100, QualityFlag::Typical);
        record.data_quality_score = 60.0;
        record.refresh_completeness();

        assert!(RecordQuery::default().matches(&record));
        assert!(RecordQuery {
            name_contains: Some("väsby".to_string()),
            ..Default::default()
        }
        .matches(&record));
        assert!(!RecordQuery {
            status: Some(RecordStatus::Complete),
            ..Default::default()
        }
        .matches(&record));
        assert!(!RecordQuery {
            min_quality: Some(80.0),
            ..Default::default()
        }
        .matches(&record));
        assert!(RecordQuery {
            missing_field: Some(FieldName::BuildingPermitRate),
            ..Default::default()
        }
        .matches(&record));
        assert!(!RecordQuery {
            missing_field: Some(FieldName::FoodControlRate),
            ..Default::default()
        }
        .matches(&record));
    }
}
