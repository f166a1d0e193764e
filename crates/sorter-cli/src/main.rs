//! Invoice Sorter - files invoice PDFs into month folders by their creation date.

use clap::Parser;
use sorter_cli::commands;
use sorter_cli::{logging, Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> sorter_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config from --config or the default location
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_secrets(cli.anthropic_key, cli.pushover_token, cli.pushover_user);

    // Held until run() returns so buffered file logs are flushed
    let _log_guard = logging::init(cli.verbose, &config.logging)?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await?,
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await?,
        Command::Ask(args) => commands::execute_ask(args, &config, &formatter).await?,
    }

    Ok(())
}
