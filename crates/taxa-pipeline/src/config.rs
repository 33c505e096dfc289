//! Pipeline configuration
//!
//! One TOML document with a table per stage:
//!
//! ```toml
//! [extractor]
//! max_text_length = 100000
//!
//! [validation]
//! low_confidence_threshold = 0.5
//!
//! [dedup]
//! gap_fill = true
//!
//! [export]
//! output_dir = "output"
//! file_prefix = "municipal_fees"
//! ```
//!
//! A missing table falls back to that stage's defaults.

use serde::{Deserialize, Serialize};
use taxa_dedup::DedupConfig;
use taxa_export::ExportConfig;
use taxa_extractor::ExtractorConfig;
use taxa_gatekeeper::ValidationConfig;

/// Configuration of every pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fact extraction
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Validation rules and score weights
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Deduplication
    #[serde(default)]
    pub dedup: DedupConfig,

    /// Export formats and destination
    #[serde(default)]
    pub export: ExportConfig,
}

impl PipelineConfig {
    /// Strict preset for every stage
    pub fn strict() -> Self {
        Self {
            extractor: ExtractorConfig::strict(),
            validation: ValidationConfig::strict(),
            dedup: DedupConfig::strict(),
            export: ExportConfig::default(),
        }
    }

    /// Lenient preset for every stage
    pub fn lenient() -> Self {
        Self {
            extractor: ExtractorConfig::lenient(),
            validation: ValidationConfig::lenient(),
            dedup: DedupConfig::lenient(),
            export: ExportConfig::default(),
        }
    }

    /// Validate every stage, naming the table that failed
    pub fn validate(&self) -> Result<(), String> {
        self.extractor
            .validate()
            .map_err(|e| format!("[extractor] {}", e))?;
        self.validation
            .validate()
            .map_err(|e| format!("[validation] {}", e))?;
        self.dedup.validate().map_err(|e| format!("[dedup] {}", e))?;
        self.export.validate().map_err(|e| format!("[export] {}", e))?;
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
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::strict().validate().is_ok());
        assert!(PipelineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = PipelineConfig::from_toml(
            r#"
[dedup]
gap_fill = false

[export]
output_dir = "exports"
file_prefix = "fees"
xlsx = false
"#,
        )
        .unwrap();

        assert!(!config.dedup.gap_fill);
        assert_eq!(config.export.file_prefix, "fees");
        assert!(!config.export.xlsx);
        assert_eq!(config.validation, ValidationConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::lenient();
        let toml_str = config.to_toml().unwrap();
        assert_eq!(PipelineConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_validate_names_the_table() {
        let mut config = PipelineConfig::default();
        config.dedup.weights.completeness = 2.0;
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("[dedup]"));
    }
}
