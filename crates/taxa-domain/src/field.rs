//! Field identifiers and value types for the three target facts

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three facts collected per municipality
///
/// The wire identifiers are the Swedish field names used by the crawler;
/// the positional aliases `FIELD_1`..`FIELD_3` are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldName {
    /// Hourly rate for food control (kr/hour)
    #[serde(rename = "timtaxa_livsmedel", alias = "FIELD_1")]
    FoodControlRate,

    /// Billing model for food control (prepaid or post-paid)
    #[serde(rename = "debitering_livsmedel", alias = "FIELD_2")]
    FoodControlBilling,

    /// Hourly rate for building permits (kr/hour)
    #[serde(rename = "timtaxa_bygglov", alias = "FIELD_3")]
    BuildingPermitRate,
}

impl FieldName {
    /// All fields in export column order
    pub const ALL: [FieldName; 3] = [
        FieldName::FoodControlRate,
        FieldName::FoodControlBilling,
        FieldName::BuildingPermitRate,
    ];

    /// Number of target fields; the completeness denominator
    pub const COUNT: usize = 3;

    /// Get the wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FoodControlRate => "timtaxa_livsmedel",
            FieldName::FoodControlBilling => "debitering_livsmedel",
            FieldName::BuildingPermitRate => "timtaxa_bygglov",
        }
    }

    /// Parse a field from its identifier or positional alias
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "timtaxa_livsmedel" | "field_1" => Some(FieldName::FoodControlRate),
            "debitering_livsmedel" | "field_2" => Some(FieldName::FoodControlBilling),
            "timtaxa_bygglov" | "field_3" => Some(FieldName::BuildingPermitRate),
            _ => None,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            FieldName::FoodControlRate => "Hourly rate for food control (kr)",
            FieldName::FoodControlBilling => "Billing model for food control",
            FieldName::BuildingPermitRate => "Hourly rate for building permits (kr)",
        }
    }

    /// Whether the field holds an integer rate
    pub fn is_numeric(&self) -> bool {
        !matches!(self, FieldName::FoodControlBilling)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value of a fact as supplied by the extractor
///
/// Deserialized untagged: JSON integers, decimals and strings map to the
/// matching variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Whole number
    Integer(i64),
    /// Number with a fractional part
    Decimal(f64),
    /// Free text as seen on the source
    Text(String),
}

impl FieldValue {
    /// Render the value as source text
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Integer(v) => v.to_string(),
            FieldValue::Decimal(v) => v.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Canonical billing model for food control
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BillingModel {
    /// Fee is charged in advance
    #[serde(rename = "förskott")]
    Forskott,
    /// Fee is charged after the inspection
    #[serde(rename = "efterhand")]
    Efterhand,
}

impl BillingModel {
    /// Both canonical values
    pub const ALL: [BillingModel; 2] = [BillingModel::Forskott, BillingModel::Efterhand];

    /// Get the canonical text
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingModel::Forskott => "förskott",
            BillingModel::Efterhand => "efterhand",
        }
    }

    /// Parse an exact canonical value (case-insensitive)
    ///
    /// Synonym matching belongs to the validation stage; this only accepts
    /// the two canonical spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "förskott" => Some(BillingModel::Forskott),
            "efterhand" => Some(BillingModel::Efterhand),
            _ => None,
        }
    }
}

impl fmt::Display for BillingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Annotation for a rate that is valid but outside its typical range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFlag {
    /// Inside the typical range
    Typical,
    /// Below the typical range
    Low,
    /// Above the typical range
    High,
}

impl QualityFlag {
    /// Get the flag as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::Typical => "typical",
            QualityFlag::Low => "low",
            QualityFlag::High => "high",
        }
    }

    /// Parse a flag from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "typical" => Some(QualityFlag::Typical),
            "low" => Some(QualityFlag::Low),
            "high" => Some(QualityFlag::High),
            _ => None,
        }
    }
}
