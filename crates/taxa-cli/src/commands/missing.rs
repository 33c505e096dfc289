//! Missing command implementation.

use crate::cli::SnapshotArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the missing command.
pub fn execute_missing(args: SnapshotArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = super::open_snapshot(&args, &config.pipeline.export)?;
    let rows = store.missing_data()?;

    println!("{}", formatter.format_missing(&rows)?);
    Ok(())
}
