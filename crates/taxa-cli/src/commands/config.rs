//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    explicit_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", Config::resolve_path(explicit_path)?.display());
        }
        ConfigAction::Init { preset, force } => {
            let path = Config::resolve_path(explicit_path)?;
            if path.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists; use --force to overwrite",
                    path.display()
                )));
            }

            let fresh = Config {
                settings: config.settings.clone(),
                pipeline: preset.into(),
            };
            fresh.save_to(&path)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote configuration to {}", path.display()))
            );
        }
    }

    Ok(())
}
