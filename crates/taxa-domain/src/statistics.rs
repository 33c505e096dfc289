//! Aggregate statistics over a final record set

use crate::field::{BillingModel, FieldName};
use crate::quality::QualityBucket;
use crate::record::{MunicipalRecord, RecordStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of `count` in `total` as a percentage, 0.0 for an empty total
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// How many records populate a field
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldCoverage {
    /// Records with the field populated
    pub count: usize,
    /// Share of all records [0, 100]
    pub percentage: f64,
}

/// Min / max / average of one rate field over the populated records
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Records with a value
    pub count: usize,
    /// Smallest value, 0 when there are none
    pub min: i64,
    /// Largest value, 0 when there are none
    pub max: i64,
    /// Mean value, 0.0 when there are none
    pub average: f64,
}

impl NumericSummary {
    /// Summarize a set of values
    pub fn from_values(values: &[i64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let sum: i64 = values.iter().sum();
        Self {
            count: values.len(),
            min: values.iter().copied().min().unwrap_or_default(),
            max: values.iter().copied().max().unwrap_or_default(),
            average: sum as f64 / values.len() as f64,
        }
    }
}

/// Record counts per quality bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityHistogram {
    /// Score >= 85
    pub excellent: usize,
    /// Score >= 65
    pub good: usize,
    /// Score >= 40
    pub fair: usize,
    /// Score < 40
    pub poor: usize,
}

impl QualityHistogram {
    /// Count one record in its bucket
    pub fn record(&mut self, bucket: QualityBucket) {
        match bucket {
            QualityBucket::Excellent => self.excellent += 1,
            QualityBucket::Good => self.good += 1,
            QualityBucket::Fair => self.fair += 1,
            QualityBucket::Poor => self.poor += 1,
        }
    }

    /// Count for one bucket
    pub fn count(&self, bucket: QualityBucket) -> usize {
        match bucket {
            QualityBucket::Excellent => self.excellent,
            QualityBucket::Good => self.good,
            QualityBucket::Fair => self.fair,
            QualityBucket::Poor => self.poor,
        }
    }

    /// Sum over all buckets
    pub fn total(&self) -> usize {
        self.excellent + self.good + self.fair + self.poor
    }
}

/// Record counts per billing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BillingDistribution {
    /// Prepaid
    #[serde(rename = "förskott")]
    pub forskott: usize,
    /// Post-paid
    pub efterhand: usize,
}

impl BillingDistribution {
    /// Count one record's billing model
    pub fn record(&mut self, model: BillingModel) {
        match model {
            BillingModel::Forskott => self.forskott += 1,
            BillingModel::Efterhand => self.efterhand += 1,
        }
    }

    /// Count for one model
    pub fn count(&self, model: BillingModel) -> usize {
        match model {
            BillingModel::Forskott => self.forskott,
            BillingModel::Efterhand => self.efterhand,
        }
    }
}

/// Coverage and value summary of a final record set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateStatistics {
    /// Records in the set
    pub total_records: usize,
    /// Records with all three fields
    pub complete_records: usize,
    /// Records with one or two fields
    pub partial_records: usize,
    /// Complete records as a percentage of the total
    pub completion_rate: f64,
    /// Mean completeness score [0, 1]
    pub average_completeness: f64,
    /// Mean data quality score [0, 100]
    pub average_data_quality: f64,
    /// Coverage per field
    pub field_coverage: BTreeMap<FieldName, FieldCoverage>,
    /// Food-control rate values
    pub food_control_rate: NumericSummary,
    /// Building-permit rate values
    pub building_permit_rate: NumericSummary,
    /// Records per quality bucket
    pub quality_distribution: QualityHistogram,
    /// Records per billing model
    pub billing_distribution: BillingDistribution,
}

impl AggregateStatistics {
    /// Compute statistics for a record set
    ///
    /// An empty set yields all-zero values.
    pub fn from_records(records: &[MunicipalRecord]) -> Self {
        let total = records.len();
        let complete = records
            .iter()
            .filter(|r| r.status == RecordStatus::Complete)
            .count();

        let field_coverage = FieldName::ALL
            .into_iter()
            .map(|field| {
                let count = records.iter().filter(|r| r.is_populated(field)).count();
                (
                    field,
                    FieldCoverage {
                        count,
                        percentage: percentage(count, total),
                    },
                )
            })
            .collect();

        let mut quality_distribution = QualityHistogram::default();
        let mut billing_distribution = BillingDistribution::default();
        for record in records {
            quality_distribution.record(record.quality_bucket());
            if let Some(model) = record.billing_model {
                billing_distribution.record(model);
            }
        }

        let rates = |field: FieldName| -> Vec<i64> {
            records.iter().filter_map(|r| r.rate(field)).collect()
        };

        let mean = |f: fn(&MunicipalRecord) -> f64| -> f64 {
            if total == 0 {
                0.0
            } else {
                records.iter().map(f).sum::<f64>() / total as f64
            }
        };

        Self {
            total_records: total,
            complete_records: complete,
            partial_records: total - complete,
            completion_rate: percentage(complete, total),
            average_completeness: mean(|r| r.completeness_score),
            average_data_quality: mean(|r| r.data_quality_score),
            field_coverage,
            food_control_rate: NumericSummary::from_values(&rates(FieldName::FoodControlRate)),
            building_permit_rate: NumericSummary::from_values(&rates(
                FieldName::BuildingPermitRate,
            )),
            quality_distribution,
            billing_distribution,
        }
    }

    /// Coverage of one field
    pub fn coverage(&self, field: FieldName) -> FieldCoverage {
        self.field_coverage.get(&field).copied().unwrap_or_default()
    }

    /// Flat key/value rows for summary sheets and the snapshot table
    pub fn key_values(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("total_records".to_string(), self.total_records.to_string()),
            ("complete_records".to_string(), self.complete_records.to_string()),
            ("partial_records".to_string(), self.partial_records.to_string()),
            ("completion_rate".to_string(), format!("{:.1}", self.completion_rate)),
            (
                "average_completeness".to_string(),
                format!("{:.3}", self.average_completeness),
            ),
            (
                "average_data_quality".to_string(),
                format!("{:.1}", self.average_data_quality),
            ),
        ];

        for field in FieldName::ALL {
            let coverage = self.coverage(field);
            rows.push((format!("{}_count", field), coverage.count.to_string()));
            rows.push((
                format!("{}_coverage", field),
                format!("{:.1}", coverage.percentage),
            ));
        }

        for (name, summary) in [
            ("timtaxa_livsmedel", &self.food_control_rate),
            ("timtaxa_bygglov", &self.building_permit_rate),
        ] {
            rows.push((format!("{}_min", name), summary.min.to_string()));
            rows.push((format!("{}_max", name), summary.max.to_string()));
            rows.push((format!("{}_avg", name), format!("{:.1}", summary.average)));
        }

        for bucket in QualityBucket::ALL {
            rows.push((
                format!("quality_{}", bucket.as_str()),
                self.quality_distribution.count(bucket).to_string(),
            ));
        }

        for model in BillingModel::ALL {
            rows.push((
                format!("billing_{}", model.as_str()),
                self.billing_distribution.count(model).to_string(),
            ));
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::QualityFlag;

    fn record(name: &str, food: Option<i64>, billing: Option<BillingModel>, quality: f64) -> MunicipalRecord {
        let mut r = MunicipalRecord::new(name);
        if let Some(v) = food {
            r.set_rate(FieldName::FoodControlRate, v, QualityFlag::Typical);
        }
        if let Some(m) = billing {
            r.set_billing(m, m.as_str());
        }
        r.data_quality_score = quality;
        r.refresh_completeness();
        r
    }

    #[test]
    fn test_empty_set_is_all_zero() {
        let stats = AggregateStatistics::from_records(&[]);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_data_quality, 0.0);
        for field in FieldName::ALL {
            assert_eq!(stats.coverage(field).percentage, 0.0);
        }
        assert_eq!(stats.food_control_rate, NumericSummary::default());
        assert_eq!(stats.quality_distribution.total(), 0);
    }

    #[test]
    fn test_coverage_and_values() {
        let records = vec![
            record("Ale", Some(1000), Some(BillingModel::Forskott), 90.0),
            record("Bjuv", Some(1500), None, 50.0),
            record("Dals-Ed", None, Some(BillingModel::Forskott), 20.0),
            record("Eda", None, Some(BillingModel::Efterhand), 70.0),
        ];
        let stats = AggregateStatistics::from_records(&records);

        assert_eq!(stats.total_records, 4);
        assert_eq!(stats.partial_records, 4);
        assert_eq!(stats.coverage(FieldName::FoodControlRate).count, 2);
        assert_eq!(stats.coverage(FieldName::FoodControlRate).percentage, 50.0);
        assert_eq!(stats.coverage(FieldName::FoodControlBilling).percentage, 75.0);
        assert_eq!(stats.coverage(FieldName::BuildingPermitRate).count, 0);

        assert_eq!(stats.food_control_rate.min, 1000);
        assert_eq!(stats.food_control_rate.max, 1500);
        assert_eq!(stats.food_control_rate.average, 1250.0);

        assert_eq!(stats.billing_distribution.forskott, 2);
        assert_eq!(stats.billing_distribution.efterhand, 1);

        assert_eq!(stats.quality_distribution.excellent, 1);
        assert_eq!(stats.quality_distribution.good, 1);
        assert_eq!(stats.quality_distribution.fair, 1);
        assert_eq!(stats.quality_distribution.poor, 1);
        assert_eq!(stats.average_data_quality, 57.5);
    }

    #[test]
    fn test_key_values_cover_every_field() {
        let stats = AggregateStatistics::from_records(&[]);
        let rows = stats.key_values();
        for field in FieldName::ALL {
            let key = format!("{}_coverage", field);
            assert!(rows.iter().any(|(k, _)| *k == key));
        }
        assert!(rows.iter().any(|(k, v)| k == "billing_förskott" && v == "0"));
    }

    #[test]
    fn test_billing_distribution_wire_names() {
        let json = serde_json::to_value(BillingDistribution {
            forskott: 3,
            efterhand: 1,
        })
        .unwrap();
        assert_eq!(json["förskott"], 3);
        assert_eq!(json["efterhand"], 1);
    }
}
