//! CLI command definitions and argument parsing.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Invoice Sorter - File invoice PDFs into month folders by their creation date.
#[derive(Debug, Parser)]
#[command(name = "invoice-sorter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_KEY", hide_env_values = true, global = true)]
    pub anthropic_key: Option<String>,

    /// Pushover application token
    #[arg(long, env = "PUSHOVER_API_TOKEN", hide_env_values = true, global = true)]
    pub pushover_token: Option<String>,

    /// Pushover user key
    #[arg(long, env = "PUSHOVER_USER_KEY", hide_env_values = true, global = true)]
    pub pushover_user: Option<String>,

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
    /// Quiet format (paths and values only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch new invoices, read their dates and file them
    Run(RunArgs),

    /// Extract the date (or custom fields) from one PDF
    Extract(ExtractArgs),

    /// Send a free-form prompt to the model
    Ask(AskArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Process mail since this date (YYYY-MM-DD) instead of the last run
    #[arg(long, value_parser = parse_date)]
    pub since: Option<NaiveDate>,

    /// Show where invoices would be filed without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// PDF file to read
    pub file: PathBuf,

    /// JSON file of field descriptors to extract instead of the invoice date
    #[arg(long)]
    pub fields: Option<PathBuf>,
}

/// Arguments for the ask command.
#[derive(Debug, Parser)]
pub struct AskArgs {
    /// Prompt text
    pub prompt: String,
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

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}
