//! The statistics JSON document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taxa_domain::{
    percentage, AggregateStatistics, BillingDistribution, FieldName, NumericSummary,
    QualityBucket,
};

/// Run-level counts and averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySection {
    /// Export run id
    pub run_id: String,
    /// Export run timestamp
    pub timestamp: String,
    /// Records exported
    pub total_records: usize,
    /// Records with all fields
    pub complete_records: usize,
    /// Records with some fields
    pub partial_records: usize,
    /// Complete records, percent of total
    pub completion_rate: f64,
    /// Mean completeness score
    pub average_completeness: f64,
    /// Mean data quality score
    pub average_data_quality: f64,
}

/// Coverage of one field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageEntry {
    /// Records with the field populated
    pub count: usize,
    /// Share of records, percent
    pub percentage: f64,
    /// Records exported
    pub total_municipalities: usize,
}

/// Size of one quality band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketEntry {
    /// Records in the band
    pub count: usize,
    /// Share of records, percent
    pub percentage: f64,
}

/// Value summaries per field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAnalysis {
    /// Food-control rate summary
    pub timtaxa_livsmedel: NumericSummary,
    /// Billing model distribution
    pub debitering_livsmedel: BillingDistribution,
    /// Building-permit rate summary
    pub timtaxa_bygglov: NumericSummary,
}

/// Statistics document with exactly four sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsDocument {
    /// Counts and averages
    pub summary: SummarySection,
    /// Coverage per field
    pub field_coverage: BTreeMap<FieldName, CoverageEntry>,
    /// Records per quality band
    pub quality_distribution: BTreeMap<QualityBucket, BucketEntry>,
    /// Value summaries
    pub value_analysis: ValueAnalysis,
}

impl StatisticsDocument {
    /// Build the document for one run
    pub fn new(statistics: &AggregateStatistics, run_id: &str, timestamp: &str) -> Self {
        let total = statistics.total_records;

        Self {
            summary: SummarySection {
                run_id: run_id.to_string(),
                timestamp: timestamp.to_string(),
                total_records: total,
                complete_records: statistics.complete_records,
                partial_records: statistics.partial_records,
                completion_rate: statistics.completion_rate,
                average_completeness: statistics.average_completeness,
                average_data_quality: statistics.average_data_quality,
            },
            field_coverage: FieldName::ALL
                .into_iter()
                .map(|field| {
                    let coverage = statistics.coverage(field);
                    (
                        field,
                        CoverageEntry {
                            count: coverage.count,
                            percentage: coverage.percentage,
                            total_municipalities: total,
                        },
                    )
                })
                .collect(),
            quality_distribution: QualityBucket::ALL
                .into_iter()
                .map(|bucket| {
                    let count = statistics.quality_distribution.count(bucket);
                    (
                        bucket,
                        BucketEntry {
                            count,
                            percentage: percentage(count, total),
                        },
                    )
                })
                .collect(),
            value_analysis: ValueAnalysis {
                timtaxa_livsmedel: statistics.food_control_rate,
                debitering_livsmedel: statistics.billing_distribution,
                timtaxa_bygglov: statistics.building_permit_rate,
            },
        }
    }
}
