//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taxa - Validate, deduplicate and export municipal fee data.
#[derive(Debug, Parser)]
#[command(name = "taxa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path (default: ~/.taxa/config.toml)
    #[arg(short, long, global = true, env = "TAXA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names and paths only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run validation, deduplication and export over a fact list
    Run(RunArgs),

    /// Extract facts from a plain-text document
    Extract(ExtractArgs),

    /// Show one municipality from a snapshot
    Show(ShowArgs),

    /// List municipalities from a snapshot
    List(ListArgs),

    /// List municipalities with missing fields
    Missing(SnapshotArgs),

    /// Show the statistics of the latest export run
    Stats(SnapshotArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// JSON file containing the fact list
    #[arg(long)]
    pub facts: Option<PathBuf>,

    /// Read the fact list from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Override the export directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Plain-text document to read
    pub file: PathBuf,

    /// Municipality the document belongs to
    #[arg(short, long)]
    pub municipality: String,

    /// URL the document was fetched from
    #[arg(short, long)]
    pub url: String,

    /// Continue through validation, deduplication and export
    #[arg(long)]
    pub run: bool,
}

/// Arguments naming a snapshot database.
#[derive(Debug, Parser)]
pub struct SnapshotArgs {
    /// Snapshot database (default: newest snapshot in the export directory)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Municipality name (case-insensitive)
    pub name: String,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Filter by part of the municipality name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Filter by status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Minimum data quality score (0-100)
    #[arg(long)]
    pub min_quality: Option<f64>,

    /// Only municipalities missing this field
    #[arg(long, value_enum)]
    pub missing: Option<FieldArg>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration as TOML
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file with defaults
    Init {
        /// Start from a preset
        #[arg(short, long, value_enum, default_value = "default")]
        preset: PresetArg,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Record status argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StatusArg {
    /// All three fields populated
    Complete,
    /// One or two fields populated
    Partial,
}

/// Field argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum FieldArg {
    /// Food-control hourly rate
    TimtaxaLivsmedel,
    /// Food-control billing model
    DebiteringLivsmedel,
    /// Building-permit hourly rate
    TimtaxaBygglov,
}

/// Configuration preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Balanced defaults
    Default,
    /// Narrow extraction, no gap filling
    Strict,
    /// Wide extraction and bounds
    Lenient,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<StatusArg> for taxa_domain::RecordStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Complete => taxa_domain::RecordStatus::Complete,
            StatusArg::Partial => taxa_domain::RecordStatus::Partial,
        }
    }
}

impl From<FieldArg> for taxa_domain::FieldName {
    fn from(field: FieldArg) -> Self {
        match field {
            FieldArg::TimtaxaLivsmedel => taxa_domain::FieldName::FoodControlRate,
            FieldArg::DebiteringLivsmedel => taxa_domain::FieldName::FoodControlBilling,
            FieldArg::TimtaxaBygglov => taxa_domain::FieldName::BuildingPermitRate,
        }
    }
}

impl From<PresetArg> for taxa_pipeline::PipelineConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => taxa_pipeline::PipelineConfig::default(),
            PresetArg::Strict => taxa_pipeline::PipelineConfig::strict(),
            PresetArg::Lenient => taxa_pipeline::PipelineConfig::lenient(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["taxa", "run", "--facts", "facts.json"]);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.facts, Some(PathBuf::from("facts.json")));
                assert!(!args.stdin);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_show_command_with_db() {
        let cli = Cli::parse_from(["taxa", "show", "Stockholm", "--db", "snap.db", "-f", "json"]);
        match cli.command {
            Command::Show(args) => {
                assert_eq!(args.name, "Stockholm");
                assert_eq!(args.snapshot.db, Some(PathBuf::from("snap.db")));
            }
            _ => panic!("Expected Show command"),
        }
        assert!(matches!(cli.format, Some(CliFormat::Json)));
    }

    #[test]
    fn test_list_filters() {
        let cli = Cli::parse_from([
            "taxa",
            "list",
            "--status",
            "partial",
            "--missing",
            "timtaxa-bygglov",
        ]);
        match cli.command {
            Command::List(args) => {
                let status: taxa_domain::RecordStatus = args.status.unwrap().into();
                let field: taxa_domain::FieldName = args.missing.unwrap().into();
                assert_eq!(status, taxa_domain::RecordStatus::Partial);
                assert_eq!(field, taxa_domain::FieldName::BuildingPermitRate);
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_config_init_preset() {
        let cli = Cli::parse_from(["taxa", "config", "init", "--preset", "strict"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { preset, force },
            }) => {
                let config: taxa_pipeline::PipelineConfig = preset.into();
                assert!(!config.dedup.gap_fill);
                assert!(!force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
