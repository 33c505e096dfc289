//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use std::io::{self, Read};
use taxa_pipeline::{parse_facts, Pipeline, PipelineResult};

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let result = run_facts(&args, config).await?;

    println!("{}", formatter.format_result(&result)?);

    if result.is_empty_input() {
        eprintln!("{}", formatter.warning("The fact list was empty"));
    }

    let failed = result.manifest.failed();
    for outcome in &failed {
        eprintln!(
            "{}",
            formatter.error(&format!(
                "{}: {}",
                outcome.format,
                outcome.error.as_deref().unwrap_or_default()
            ))
        );
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::ExportIncomplete(failed.len()))
    }
}

/// Read the fact list and run the pipeline over it.
pub async fn run_facts(args: &RunArgs, config: &Config) -> Result<PipelineResult> {
    // Read facts from file or stdin
    let json_data = if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(file_path) = &args.facts {
        fs::read_to_string(file_path)?
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either --facts or --stdin".to_string(),
        ));
    };

    let facts = parse_facts(&json_data)?;

    let mut pipeline_config = config.pipeline.clone();
    if let Some(dir) = &args.output_dir {
        pipeline_config.export.output_dir = dir.clone();
    }

    let pipeline = Pipeline::new(pipeline_config)?;
    Ok(pipeline.run(&facts).await)
}
