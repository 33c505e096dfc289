//! Configuration for the Deduplicator

use serde::{Deserialize, Serialize};

/// Weights of the candidate score used to pick a group's base record
///
/// `data_quality` is applied to the 0-100 score divided by 100, so every
/// term is in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupWeights {
    /// Weight of the completeness score
    pub completeness: f64,
    /// Weight of the data quality score
    pub data_quality: f64,
    /// Weight of the mean extraction confidence
    pub confidence: f64,
    /// Weight of the mean source reliability
    pub source_reliability: f64,
}

impl Default for DedupWeights {
    fn default() -> Self {
        Self {
            completeness: 0.4,
            data_quality: 0.3,
            confidence: 0.2,
            source_reliability: 0.1,
        }
    }
}

impl DedupWeights {
    /// Check that weights are non-negative and sum to 1
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            self.completeness,
            self.data_quality,
            self.confidence,
            self.source_reliability,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("dedup weights must be finite and non-negative".to_string());
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(format!("dedup weights must sum to 1.0, got {}", sum));
        }
        Ok(())
    }
}

/// Configuration for the Deduplicator
///
/// # Examples
///
/// ```
/// use taxa_dedup::DedupConfig;
///
/// let config = DedupConfig::default();
/// assert!(config.gap_fill);
/// assert_eq!(config.weights.completeness, 0.4);
///
/// // Keep the winner as-is, no gap filling
/// let config = DedupConfig::strict();
/// assert!(!config.gap_fill);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Fill the base record's missing fields from the other candidates
    #[serde(default = "default_gap_fill")]
    pub gap_fill: bool,

    /// Candidate score weights
    #[serde(default)]
    pub weights: DedupWeights,
}

fn default_gap_fill() -> bool {
    true
}

impl Default for DedupConfig {
    /// Gap filling on, weights 0.4 / 0.3 / 0.2 / 0.1
    fn default() -> Self {
        Self {
            gap_fill: default_gap_fill(),
            weights: DedupWeights::default(),
        }
    }
}

impl DedupConfig {
    /// Strict preset: best candidate wins outright, nothing is merged in
    pub fn strict() -> Self {
        Self {
            gap_fill: false,
            ..Self::default()
        }
    }

    /// Lenient preset: favours the most complete candidate, then fills gaps
    pub fn lenient() -> Self {
        Self {
            gap_fill: true,
            weights: DedupWeights {
                completeness: 0.6,
                data_quality: 0.2,
                confidence: 0.1,
                source_reliability: 0.1,
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.weights.validate()
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
