//! Gatekeeper configuration
//!
//! Per-field rules live in one table keyed by [`FieldName`], so adding a
//! field means adding a rule, not another branch in the validator.

use serde::{Deserialize, Serialize};
use taxa_domain::{BillingModel, FieldName};

/// Hard bounds and typical range for an integer rate field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRule {
    /// Smallest accepted value (inclusive)
    pub min: i64,
    /// Largest accepted value (inclusive)
    pub max: i64,
    /// Lower end of the typical range
    pub typical_min: i64,
    /// Upper end of the typical range
    pub typical_max: i64,
}

impl NumericRule {
    /// Rule with the given hard bounds and typical range
    pub fn new(min: i64, max: i64, typical_min: i64, typical_max: i64) -> Self {
        Self {
            min,
            max,
            typical_min,
            typical_max,
        }
    }

    fn check(&self) -> Result<(), String> {
        if self.min > self.max {
            return Err(format!("min {} exceeds max {}", self.min, self.max));
        }
        if self.typical_min > self.typical_max {
            return Err(format!(
                "typical_min {} exceeds typical_max {}",
                self.typical_min, self.typical_max
            ));
        }
        Ok(())
    }
}

/// Synonym lists for the billing model
///
/// Matching is case-insensitive containment, and the `forskott` list is
/// always checked before the `efterhand` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumRule {
    /// Phrases meaning "charged in advance"
    pub forskott: Vec<String>,
    /// Phrases meaning "charged afterwards"
    pub efterhand: Vec<String>,
}

impl EnumRule {
    /// Synonym lists in match order
    pub fn ordered(&self) -> [(BillingModel, &[String]); 2] {
        [
            (BillingModel::Forskott, self.forskott.as_slice()),
            (BillingModel::Efterhand, self.efterhand.as_slice()),
        ]
    }

    fn check(&self) -> Result<(), String> {
        if self.forskott.is_empty() || self.efterhand.is_empty() {
            return Err("both synonym lists need at least one entry".to_string());
        }
        if self
            .forskott
            .iter()
            .chain(&self.efterhand)
            .any(|s| s.trim().is_empty())
        {
            return Err("synonyms must not be blank".to_string());
        }
        Ok(())
    }
}

impl Default for EnumRule {
    fn default() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self {
            forskott: owned(&[
                "förskott",
                "förväg",
                "advance",
                "prepaid",
                "i förskott",
                "förskottsbetalning",
                "förskottsfaktura",
                "betalas i förväg",
            ]),
            efterhand: owned(&[
                "efterhand",
                "efterskott",
                "faktura",
                "i efterhand",
                "efterhandsdebitering",
                "efterhandsfaktura",
                "betalas efter",
                "debiteras efter",
                "faktureras efter",
            ]),
        }
    }
}

/// Validation rule for one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule<'a> {
    /// Integer in a range
    Numeric(&'a NumericRule),
    /// One of the billing models
    Enumerated(&'a EnumRule),
}

/// Weights of the composite data quality score
///
/// The four weights must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of the mean extraction confidence
    pub confidence: f64,
    /// Weight of the completeness score
    pub completeness: f64,
    /// Weight of the source reliability heuristic
    pub source_reliability: f64,
    /// Weight of the share of values inside their typical range
    pub typicality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            confidence: 0.4,
            completeness: 0.3,
            source_reliability: 0.2,
            typicality: 0.1,
        }
    }
}

impl ScoreWeights {
    /// Check that weights are non-negative and sum to 1
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            self.confidence,
            self.completeness,
            self.source_reliability,
            self.typicality,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("score weights must be finite and non-negative".to_string());
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("score weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }
}

/// Configuration for validation rules
///
/// # Examples
///
/// ```
/// use taxa_gatekeeper::ValidationConfig;
///
/// let config = ValidationConfig::default();
/// assert_eq!(config.food_control_rate.min, 800);
/// assert_eq!(config.food_control_rate.max, 2000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Cleaned names that reject the whole record (case-insensitive)
    #[serde(default = "default_placeholder_names")]
    pub placeholder_names: Vec<String>,

    /// Mean confidence below which a record gets a warning
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f64,

    /// Rule for `timtaxa_livsmedel`
    pub food_control_rate: NumericRule,

    /// Rule for `debitering_livsmedel`
    pub billing_model: EnumRule,

    /// Rule for `timtaxa_bygglov`
    pub building_permit_rate: NumericRule,

    /// Composite score weights
    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_placeholder_names() -> Vec<String> {
    ["test", "example", "sample", "xxx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_low_confidence_threshold() -> f64 {
    0.5
}

impl Default for ValidationConfig {
    /// Bounds 800-2000 kr for both rates
    ///
    /// - Food control typical range: 1000-1600
    /// - Building permit typical range: 900-1500
    fn default() -> Self {
        Self {
            placeholder_names: default_placeholder_names(),
            low_confidence_threshold: default_low_confidence_threshold(),
            food_control_rate: NumericRule::new(800, 2000, 1000, 1600),
            billing_model: EnumRule::default(),
            building_permit_rate: NumericRule::new(800, 2000, 900, 1500),
            weights: ScoreWeights::default(),
        }
    }
}

impl ValidationConfig {
    /// Strict preset: narrower typical ranges, earlier low-confidence warning
    pub fn strict() -> Self {
        Self {
            food_control_rate: NumericRule::new(800, 2000, 1100, 1500),
            building_permit_rate: NumericRule::new(800, 2000, 1000, 1400),
            low_confidence_threshold: 0.6,
            ..Self::default()
        }
    }

    /// Lenient preset: wider hard bounds for unusual fee schedules
    pub fn lenient() -> Self {
        Self {
            food_control_rate: NumericRule::new(500, 3000, 900, 1700),
            building_permit_rate: NumericRule::new(500, 3000, 800, 1600),
            low_confidence_threshold: 0.3,
            ..Self::default()
        }
    }

    /// Look up the rule for a field
    pub fn rule(&self, field: FieldName) -> FieldRule<'_> {
        match field {
            FieldName::FoodControlRate => FieldRule::Numeric(&self.food_control_rate),
            FieldName::FoodControlBilling => FieldRule::Enumerated(&self.billing_model),
            FieldName::BuildingPermitRate => FieldRule::Numeric(&self.building_permit_rate),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for field in FieldName::ALL {
            let checked = match self.rule(field) {
                FieldRule::Numeric(rule) => rule.check(),
                FieldRule::Enumerated(rule) => rule.check(),
            };
            checked.map_err(|e| format!("{}: {}", field, e))?;
        }
        self.weights.validate()?;
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err("low_confidence_threshold must be within [0.0, 1.0]".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.food_control_rate, NumericRule::new(800, 2000, 1000, 1600));
        assert_eq!(config.building_permit_rate, NumericRule::new(800, 2000, 900, 1500));
        assert_eq!(config.weights, ScoreWeights::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ValidationConfig::strict().validate().is_ok());
        assert!(ValidationConfig::lenient().validate().is_ok());
        assert!(ValidationConfig::lenient().food_control_rate.max > 2000);
    }

    #[test]
    fn test_rule_table_dispatch() {
        let config = ValidationConfig::default();
        assert!(matches!(
            config.rule(FieldName::FoodControlRate),
            FieldRule::Numeric(_)
        ));
        assert!(matches!(
            config.rule(FieldName::FoodControlBilling),
            FieldRule::Enumerated(_)
        ));
        assert!(matches!(
            config.rule(FieldName::BuildingPermitRate),
            FieldRule::Numeric(_)
        ));
    }

    #[test]
    fn test_forskott_list_checked_first() {
        let rule = EnumRule::default();
        let order = rule.ordered();
        assert_eq!(order[0].0, BillingModel::Forskott);
        assert_eq!(order[1].0, BillingModel::Efterhand);
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut config = ValidationConfig::default();
        config.building_permit_rate.min = 2500;
        let err = config.validate().unwrap_err();
        assert!(err.contains("timtaxa_bygglov"));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = ValidationConfig::default();
        config.weights.typicality = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ValidationConfig::strict();
        let toml_str = config.to_toml().unwrap();
        let parsed = ValidationConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_toml_optional_sections() {
        let toml_str = r#"
            [food_control_rate]
            min = 700
            max = 2100
            typical_min = 1000
            typical_max = 1600

            [billing_model]
            forskott = ["förskott"]
            efterhand = ["efterhand"]

            [building_permit_rate]
            min = 800
            max = 2000
            typical_min = 900
            typical_max = 1500
        "#;
        let config = ValidationConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.food_control_rate.min, 700);
        assert_eq!(config.weights, ScoreWeights::default());
        assert_eq!(config.placeholder_names.len(), 4);
    }
}
