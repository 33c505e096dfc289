//! Show and list command implementations.

use crate::cli::{ListArgs, ShowArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use taxa_domain::{RecordQuery, RecordStore};

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = super::open_snapshot(&args.snapshot, &config.pipeline.export)?;

    let record = store
        .get_record(&args.name)?
        .ok_or_else(|| CliError::NotFound(format!("municipality '{}'", args.name)))?;

    println!("{}", formatter.format_record(&record)?);
    Ok(())
}

/// Build the store query for the list command.
pub fn list_query(args: &ListArgs) -> Result<RecordQuery> {
    if let Some(min) = args.min_quality {
        if !(0.0..=100.0).contains(&min) {
            return Err(CliError::InvalidInput(
                "Quality must be between 0 and 100".to_string(),
            ));
        }
    }

    Ok(RecordQuery {
        name_contains: args.name.clone(),
        status: args.status.map(Into::into),
        min_quality: args.min_quality,
        missing_field: args.missing.map(Into::into),
        limit: args.limit,
    })
}

/// Execute the list command.
pub fn execute_list(args: ListArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let query = list_query(&args)?;
    let store = super::open_snapshot(&args.snapshot, &config.pipeline.export)?;
    let records = store.query_records(&query)?;

    println!("{}", formatter.format_records(&records)?);
    Ok(())
}
