//! Taxa CLI - Command-line interface for the municipal fee pipeline.

use clap::Parser;
use taxa_cli::commands;
use taxa_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> taxa_cli::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await?,
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await?,
        Command::Show(args) => commands::execute_show(args, &config, &formatter)?,
        Command::List(args) => commands::execute_list(args, &config, &formatter)?,
        Command::Missing(args) => commands::execute_missing(args, &config, &formatter)?,
        Command::Stats(args) => commands::execute_stats(args, &config, &formatter)?,
        Command::Config(args) => {
            commands::execute_config(args, &config, cli.config.as_deref(), &formatter)?
        }
    }

    Ok(())
}
