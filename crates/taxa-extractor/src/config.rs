//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Configuration for the Extractor
///
/// Missing keys take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length (characters); longer text is truncated
    pub max_text_length: usize,

    /// Bytes of text on each side of a rate match checked for topic words
    pub context_window: usize,

    /// Bytes of text on each side of a billing match used for scoring
    pub billing_context_window: usize,

    /// Smallest plausible hourly rate
    pub min_amount: i64,

    /// Largest plausible hourly rate
    pub max_amount: i64,

    /// Lower end of the range that earns a confidence bonus
    pub typical_min: i64,

    /// Upper end of the range that earns a confidence bonus
    pub typical_max: i64,

    /// Extra food-control rate patterns, tried after the built-in ones
    pub extra_food_control_patterns: Vec<String>,

    /// Extra building-permit rate patterns, tried after the built-in ones
    pub extra_building_permit_patterns: Vec<String>,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.context_window == 0 || self.billing_context_window == 0 {
            return Err("context windows must be greater than 0".to_string());
        }
        if self.min_amount > self.max_amount {
            return Err("min_amount cannot exceed max_amount".to_string());
        }
        if self.typical_min > self.typical_max {
            return Err("typical_min cannot exceed typical_max".to_string());
        }
        Ok(())
    }

    /// Whether an amount lies inside the plausibility window
    pub fn is_plausible(&self, amount: i64) -> bool {
        (self.min_amount..=self.max_amount).contains(&amount)
    }

    /// Whether an amount lies inside the typical range
    pub fn is_typical(&self, amount: i64) -> bool {
        (self.typical_min..=self.typical_max).contains(&amount)
    }
}

impl Default for ExtractorConfig {
    /// 100 000 characters, ±200 byte context, amounts 800-2000 kr
    fn default() -> Self {
        Self {
            max_text_length: 100_000,
            context_window: 200,
            billing_context_window: 150,
            min_amount: 800,
            max_amount: 2000,
            typical_min: 1000,
            typical_max: 1600,
            extra_food_control_patterns: Vec::new(),
            extra_building_permit_patterns: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Strict preset: tighter context, smaller text budget
    pub fn strict() -> Self {
        Self {
            max_text_length: 50_000,
            context_window: 100,
            billing_context_window: 100,
            ..Self::default()
        }
    }

    /// Lenient preset: wider context and amount window
    pub fn lenient() -> Self {
        Self {
            max_text_length: 200_000,
            context_window: 300,
            billing_context_window: 200,
            min_amount: 500,
            max_amount: 3000,
            ..Self::default()
        }
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
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_text_length, 100_000);
        assert_eq!(config.context_window, 200);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ExtractorConfig::strict().validate().is_ok());
        assert!(ExtractorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_text_length() {
        let mut config = ExtractorConfig::default();
        config.max_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_amount_window() {
        let mut config = ExtractorConfig::default();
        config.min_amount = 2500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_plausibility_is_inclusive() {
        let config = ExtractorConfig::default();
        assert!(config.is_plausible(800));
        assert!(config.is_plausible(2000));
        assert!(!config.is_plausible(799));
        assert!(!config.is_plausible(2001));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("context_window = 120").unwrap();
        assert_eq!(config.context_window, 120);
        assert_eq!(config.max_amount, 2000);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ExtractorConfig::lenient();
        config.extra_food_control_patterns = vec![r"miljöbalken.*?(\d{3,4})\s*kr".to_string()];
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
