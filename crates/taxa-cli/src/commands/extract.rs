//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::fs;
use taxa_extractor::{Document, FactExtractor};
use taxa_pipeline::Pipeline;

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let text = fs::read_to_string(&args.file)?;
    let document = Document::new(args.municipality, text, args.url);

    if args.run {
        let pipeline = Pipeline::new(config.pipeline.clone())?;
        let result = pipeline.run_documents(&[document]).await;
        println!("{}", formatter.format_result(&result)?);
        return Ok(());
    }

    let extractor = FactExtractor::new(config.pipeline.extractor.clone())?;
    let facts = extractor.extract(&document);

    if facts.is_empty() {
        eprintln!(
            "{}",
            formatter.warning(&format!("No facts found in {}", args.file.display()))
        );
    }
    println!("{}", formatter.format_facts(&facts)?);

    Ok(())
}
