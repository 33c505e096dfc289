//! Export configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One export artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Flat records, comma separated
    Csv,
    /// Workbook with records, summary and missing-data sheets
    Xlsx,
    /// Relational snapshot
    Sqlite,
    /// Aggregate statistics document
    StatisticsJson,
}

impl ExportFormat {
    /// All formats in write order
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Xlsx,
        ExportFormat::Sqlite,
        ExportFormat::StatisticsJson,
    ];

    /// Get the format name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Sqlite => "sqlite",
            ExportFormat::StatisticsJson => "statistics_json",
        }
    }

    /// File extension of the artifact
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Sqlite => "db",
            ExportFormat::StatisticsJson => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Export stage
///
/// # Examples
///
/// ```
/// use taxa_export::{ExportConfig, ExportFormat};
///
/// let config = ExportConfig::default();
/// assert_eq!(config.enabled_formats(), ExportFormat::ALL.to_vec());
///
/// let path = config.path_for(ExportFormat::StatisticsJson, "20250101_120000");
/// assert!(path.ends_with("municipal_fees_statistics_20250101_120000.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving the artifacts; created if absent
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// File name prefix of every artifact
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Write the CSV file
    #[serde(default = "enabled")]
    pub csv: bool,

    /// Write the XLSX workbook
    #[serde(default = "enabled")]
    pub xlsx: bool,

    /// Write the SQLite snapshot
    #[serde(default = "enabled")]
    pub sqlite: bool,

    /// Write the statistics JSON document
    #[serde(default = "enabled")]
    pub statistics: bool,

    /// Indent the statistics JSON
    #[serde(default = "enabled")]
    pub pretty_json: bool,
}

fn enabled() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_file_prefix() -> String {
    "municipal_fees".to_string()
}

impl Default for ExportConfig {
    /// All four formats into `./output`
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            csv: true,
            xlsx: true,
            sqlite: true,
            statistics: true,
            pretty_json: true,
        }
    }
}

impl ExportConfig {
    /// Default formats into the given directory
    pub fn in_dir(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Minimal preset: CSV and statistics only
    pub fn minimal() -> Self {
        Self {
            xlsx: false,
            sqlite: false,
            ..Self::default()
        }
    }

    /// Whether a format is switched on
    pub fn is_enabled(&self, format: ExportFormat) -> bool {
        match format {
            ExportFormat::Csv => self.csv,
            ExportFormat::Xlsx => self.xlsx,
            ExportFormat::Sqlite => self.sqlite,
            ExportFormat::StatisticsJson => self.statistics,
        }
    }

    /// Enabled formats in write order
    pub fn enabled_formats(&self) -> Vec<ExportFormat> {
        ExportFormat::ALL
            .into_iter()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }

    /// Artifact path for a format and run timestamp
    pub fn path_for(&self, format: ExportFormat, timestamp: &str) -> PathBuf {
        let name = match format {
            ExportFormat::StatisticsJson => {
                format!("{}_statistics_{}.json", self.file_prefix, timestamp)
            }
            other => format!("{}_{}.{}", self.file_prefix, timestamp, other.extension()),
        };
        self.output_dir.join(name)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.file_prefix.trim().is_empty() {
            return Err("file_prefix cannot be empty".to_string());
        }
        if self.file_prefix.contains(['/', '\\']) {
            return Err("file_prefix cannot contain path separators".to_string());
        }
        if self.enabled_formats().is_empty() {
            return Err("at least one export format must be enabled".to_string());
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
        let config = ExportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.enabled_formats().len(), 4);
    }

    #[test]
    fn test_minimal_preset() {
        let config = ExportConfig::minimal();
        assert_eq!(
            config.enabled_formats(),
            vec![ExportFormat::Csv, ExportFormat::StatisticsJson]
        );
    }

    #[test]
    fn test_artifact_paths() {
        let config = ExportConfig::in_dir("/tmp/out");
        let ts = "20250314_091500";
        assert_eq!(
            config.path_for(ExportFormat::Csv, ts),
            PathBuf::from("/tmp/out/municipal_fees_20250314_091500.csv")
        );
        assert_eq!(
            config.path_for(ExportFormat::Sqlite, ts),
            PathBuf::from("/tmp/out/municipal_fees_20250314_091500.db")
        );
        assert_eq!(
            config.path_for(ExportFormat::StatisticsJson, ts),
            PathBuf::from("/tmp/out/municipal_fees_statistics_20250314_091500.json")
        );
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = ExportConfig::default();
        config.file_prefix = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = ExportConfig::default();
        config.file_prefix = "a/b".to_string();
        assert!(config.validate().is_err());

        let config = ExportConfig {
            csv: false,
            xlsx: false,
            sqlite: false,
            statistics: false,
            ..ExportConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExportConfig::minimal();
        let toml_str = config.to_toml().unwrap();
        assert_eq!(ExportConfig::from_toml(&toml_str).unwrap(), config);
    }

    #[test]
    fn test_toml_formats_default_on() {
        let config = ExportConfig::from_toml(
            "output_dir = \"exports\"\nfile_prefix = \"fees\"\nxlsx = false\n",
        )
        .unwrap();
        assert!(config.csv);
        assert!(!config.xlsx);
        assert_eq!(config.file_prefix, "fees");
    }
}
