//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::text::{CommandTextExtractor, TextExtractor};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use sorter_extractor::{DocumentFieldsTask, ExtractorConfig, InvoiceDateTask};
use sorter_llm::{AnthropicClient, LlmProvider};

/// What was read from a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The invoice creation date
    Date(NaiveDate),
    /// Caller-declared fields
    Fields(Map<String, Value>),
}

/// Execute the extract command.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    config.validate()?;
    config.validate_anthropic()?;

    let schema = match &args.fields {
        Some(path) => Some(serde_json::from_str::<Value>(&std::fs::read_to_string(path)?)?),
        None => None,
    };

    let content = std::fs::read(&args.file)?;
    let text = CommandTextExtractor::from_settings(&config.pdf).extract(&content).await?;

    let provider = AnthropicClient::new(config.anthropic.clone())?;
    let extraction = extract_document(&provider, text, schema.as_ref(), &config.extractor).await?;

    let output = match extraction {
        Extraction::Date(date) => {
            formatter.format_invoice_date(&args.file.display().to_string(), date)?
        }
        Extraction::Fields(fields) => formatter.format_fields(&fields)?,
    };
    println!("{}", output);

    Ok(())
}

/// Run the invoice-date task, or a field task when a descriptor map is given.
pub async fn extract_document<P: LlmProvider>(
    provider: &P,
    text: String,
    schema: Option<&Value>,
    config: &ExtractorConfig,
) -> Result<Extraction> {
    match schema {
        Some(schema) => {
            if !schema.is_object() {
                return Err(CliError::InvalidInput(
                    "Field file must contain a JSON object of field descriptors".into(),
                ));
            }
            let mut task =
                DocumentFieldsTask::from_schema_json(text, schema)?.with_config(config.clone());
            provider.run_task(&mut task).await?;
            Ok(Extraction::Fields(task.values()?))
        }
        None => {
            let mut task = InvoiceDateTask::with_config(text, config.clone());
            provider.run_task(&mut task).await?;
            Ok(Extraction::Date(task.invoice_date()?))
        }
    }
}
