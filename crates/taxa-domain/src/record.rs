//! The per-municipality record built from validated facts

use crate::fact::SourceType;
use crate::field::{BillingModel, FieldName, QualityFlag};
use crate::quality::QualityBucket;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Provenance of one validated field on a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Extraction confidence of the winning fact [0.0, 1.0]
    pub confidence: f64,

    /// Kind of document the value came from
    pub source_type: SourceType,

    /// Page or document the value came from
    pub source_url: String,
}

impl Evidence {
    /// Create new evidence
    pub fn new(confidence: f64, source_type: SourceType, source_url: impl Into<String>) -> Self {
        Self {
            confidence,
            source_type,
            source_url: source_url.into(),
        }
    }
}

/// Whether every target field is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// All three fields populated
    Complete,
    /// One or two fields populated
    Partial,
}

impl RecordStatus {
    /// Status for a given number of populated fields
    pub fn from_populated(count: usize) -> Self {
        if count >= FieldName::COUNT {
            RecordStatus::Complete
        } else {
            RecordStatus::Partial
        }
    }

    /// Get the status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Complete => "complete",
            RecordStatus::Partial => "partial",
        }
    }

    /// Parse a status from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "complete" => Some(RecordStatus::Complete),
            "partial" => Some(RecordStatus::Partial),
            _ => None,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated facts for one municipality
///
/// Each optional field is either absent or carries a value that passed its
/// validation rule. `evidence` holds the provenance of every populated field
/// so the scores can be recomputed after a deduplication merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalRecord {
    /// Cleaned display name
    pub municipality: String,

    /// Food-control hourly rate (kr)
    pub food_control_rate: Option<i64>,

    /// Typical-range flag for the food-control rate
    pub food_control_rate_flag: Option<QualityFlag>,

    /// Canonical food-control billing model
    pub billing_model: Option<BillingModel>,

    /// Billing model text as it appeared on the source
    pub billing_model_original: Option<String>,

    /// Building-permit hourly rate (kr)
    pub building_permit_rate: Option<i64>,

    /// Typical-range flag for the building-permit rate
    pub building_permit_rate_flag: Option<QualityFlag>,

    /// Populated fields / 3
    pub completeness_score: f64,

    /// Composite quality score [0, 100]
    pub data_quality_score: f64,

    /// Complete or partial
    pub status: RecordStatus,

    /// Every source that contributed a value
    pub source_urls: BTreeSet<String>,

    /// Accumulated validation notes
    pub validation_warnings: Vec<String>,

    /// Provenance per populated field
    pub evidence: BTreeMap<FieldName, Evidence>,
}

impl MunicipalRecord {
    /// Create an empty record for a municipality
    pub fn new(municipality: impl Into<String>) -> Self {
        Self {
            municipality: municipality.into(),
            food_control_rate: None,
            food_control_rate_flag: None,
            billing_model: None,
            billing_model_original: None,
            building_permit_rate: None,
            building_permit_rate_flag: None,
            completeness_score: 0.0,
            data_quality_score: 0.0,
            status: RecordStatus::Partial,
            source_urls: BTreeSet::new(),
            validation_warnings: Vec::new(),
            evidence: BTreeMap::new(),
        }
    }

    /// Whether a field holds a value
    pub fn is_populated(&self, field: FieldName) -> bool {
        match field {
            FieldName::FoodControlRate => self.food_control_rate.is_some(),
            FieldName::FoodControlBilling => self.billing_model.is_some(),
            FieldName::BuildingPermitRate => self.building_permit_rate.is_some(),
        }
    }

    /// Populated fields in column order
    pub fn populated_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|f| self.is_populated(*f))
            .collect()
    }

    /// Missing fields in column order
    pub fn missing_fields(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|f| !self.is_populated(*f))
            .collect()
    }

    /// Number of populated fields
    pub fn populated_count(&self) -> usize {
        FieldName::ALL
            .into_iter()
            .filter(|f| self.is_populated(*f))
            .count()
    }

    /// Rate value of a numeric field
    pub fn rate(&self, field: FieldName) -> Option<i64> {
        match field {
            FieldName::FoodControlRate => self.food_control_rate,
            FieldName::BuildingPermitRate => self.building_permit_rate,
            FieldName::FoodControlBilling => None,
        }
    }

    /// Typical-range flag of a numeric field
    pub fn rate_flag(&self, field: FieldName) -> Option<QualityFlag> {
        match field {
            FieldName::FoodControlRate => self.food_control_rate_flag,
            FieldName::BuildingPermitRate => self.building_permit_rate_flag,
            FieldName::FoodControlBilling => None,
        }
    }

    /// Set a numeric field and its flag
    ///
    /// Ignored for the billing field.
    pub fn set_rate(&mut self, field: FieldName, value: i64, flag: QualityFlag) {
        match field {
            FieldName::FoodControlRate => {
                self.food_control_rate = Some(value);
                self.food_control_rate_flag = Some(flag);
            }
            FieldName::BuildingPermitRate => {
                self.building_permit_rate = Some(value);
                self.building_permit_rate_flag = Some(flag);
            }
            FieldName::FoodControlBilling => {}
        }
    }

    /// Set the billing model and the text it was read from
    pub fn set_billing(&mut self, model: BillingModel, original: impl Into<String>) {
        self.billing_model = Some(model);
        self.billing_model_original = Some(original.into());
    }

    /// Display text of a field value, if populated
    pub fn field_text(&self, field: FieldName) -> Option<String> {
        match field {
            FieldName::FoodControlBilling => self.billing_model.map(|m| m.as_str().to_string()),
            _ => self.rate(field).map(|v| v.to_string()),
        }
    }

    /// Mean confidence over populated fields, 0.0 when nothing is populated
    pub fn average_confidence(&self) -> f64 {
        let confidences: Vec<f64> = self
            .populated_fields()
            .into_iter()
            .filter_map(|f| self.evidence.get(&f).map(|e| e.confidence))
            .collect();

        if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        }
    }

    /// Recompute completeness and status from the populated fields
    pub fn refresh_completeness(&mut self) {
        let populated = self.populated_count();
        self.completeness_score = populated as f64 / FieldName::COUNT as f64;
        self.status = RecordStatus::from_populated(populated);
    }

    /// Copy one field from a donor if it is missing here
    ///
    /// Moves the value, its flag or original text, its evidence and the
    /// donor's source URL for that field. Never overwrites a populated
    /// field. Returns whether anything was copied.
    pub fn copy_field_from(&mut self, donor: &MunicipalRecord, field: FieldName) -> bool {
        if self.is_populated(field) || !donor.is_populated(field) {
            return false;
        }

        match field {
            FieldName::FoodControlRate => {
                self.food_control_rate = donor.food_control_rate;
                self.food_control_rate_flag = donor.food_control_rate_flag;
            }
            FieldName::FoodControlBilling => {
                self.billing_model = donor.billing_model;
                self.billing_model_original = donor.billing_model_original.clone();
            }
            FieldName::BuildingPermitRate => {
                self.building_permit_rate = donor.building_permit_rate;
                self.building_permit_rate_flag = donor.building_permit_rate_flag;
            }
        }

        if let Some(evidence) = donor.evidence.get(&field) {
            self.source_urls.insert(evidence.source_url.clone());
            self.evidence.insert(field, evidence.clone());
        }

        true
    }

    /// Reporting band of the data quality score
    pub fn quality_bucket(&self) -> QualityBucket {
        QualityBucket::from_score(self.data_quality_score)
    }

    /// Source URLs joined for flat export
    pub fn joined_source_urls(&self) -> String {
        self.source_urls
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: completeness is always populated / 3
        #[test]
        fn test_completeness_formula(
            food in proptest::option::of(800i64..=2000),
            billing in proptest::option::of(prop_oneof![Just(BillingModel::Forskott), Just(BillingModel::Efterhand)]),
            building in proptest::option::of(800i64..=2000),
        ) {
            let mut record = MunicipalRecord::new("Ale");
            if let Some(v) = food {
                record.set_rate(FieldName::FoodControlRate, v, QualityFlag::Typical);
            }
            if let Some(m) = billing {
                record.set_billing(m, m.as_str());
            }
            if let Some(v) = building {
                record.set_rate(FieldName::BuildingPermitRate, v, QualityFlag::Typical);
            }
            record.refresh_completeness();

            let populated = [food.is_some(), billing.is_some(), building.is_some()]
                .iter()
                .filter(|p| **p)
                .count();
            prop_assert_eq!(record.completeness_score, populated as f64 / 3.0);
            prop_assert_eq!(record.status == RecordStatus::Complete, populated == 3);
        }
    }
}
