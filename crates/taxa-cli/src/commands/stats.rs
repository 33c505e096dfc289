//! Stats command implementation.

use crate::cli::SnapshotArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the stats command.
pub fn execute_stats(args: SnapshotArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = super::open_snapshot(&args, &config.pipeline.export)?;
    let run = store
        .latest_run()?
        .ok_or_else(|| CliError::NotFound("statistics in snapshot".to_string()))?;

    println!("{}", formatter.format_run(&run)?);
    Ok(())
}
