//! Invoice issue-date extraction

use crate::config::ExtractorConfig;
use crate::prompt::PromptBuilder;
use chrono::NaiveDate;
use serde::Serialize;
use sorter_llm::{ChatMessage, FieldDescriptor, LlmError, NormalizedResponse, OutputSchema, Task};
use tracing::debug;

/// Name of the structured field carrying the date
pub const DATE_FIELD: &str = "date";

/// Wire format of the extracted date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Task asking the model for an invoice's creation date
#[derive(Debug, Clone)]
pub struct InvoiceDateTask {
    invoice: String,
    config: ExtractorConfig,
    response: Option<NormalizedResponse>,
}

/// Typed result of an [`InvoiceDateTask`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceDateOutput {
    /// Date exactly as returned by the model
    pub invoice_date: String,
}

impl InvoiceDateOutput {
    /// Parse the date as `YYYY-MM-DD`
    pub fn parse_date(&self) -> Result<NaiveDate, LlmError> {
        NaiveDate::parse_from_str(self.invoice_date.trim(), DATE_FORMAT).map_err(|e| {
            LlmError::Extraction {
                field: DATE_FIELD.to_string(),
                reason: format!("'{}' is not a YYYY-MM-DD date: {}", self.invoice_date, e),
            }
        })
    }
}

impl InvoiceDateTask {
    /// Create a task for the given invoice text
    pub fn new(invoice: impl Into<String>) -> Self {
        Self::with_config(invoice, ExtractorConfig::default())
    }

    /// Create a task with explicit limits
    pub fn with_config(invoice: impl Into<String>, config: ExtractorConfig) -> Self {
        Self {
            invoice: invoice.into(),
            config,
            response: None,
        }
    }

    /// Read the extracted date off the attached response
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Extraction`] when no structured response is
    /// attached or the `date` field is absent or not a string.
    pub fn output(&self) -> Result<InvoiceDateOutput, LlmError> {
        let fields = match &self.response {
            Some(NormalizedResponse::Structured { fields }) => fields,
            Some(NormalizedResponse::Message { .. }) => {
                return Err(LlmError::Extraction {
                    field: DATE_FIELD.to_string(),
                    reason: "expected structured output, got a message".to_string(),
                })
            }
            None => {
                return Err(LlmError::Extraction {
                    field: DATE_FIELD.to_string(),
                    reason: "no response attached".to_string(),
                })
            }
        };

        Ok(InvoiceDateOutput {
            invoice_date: fields.get_str(DATE_FIELD)?.to_string(),
        })
    }

    /// Shorthand for `output()?.parse_date()`
    pub fn invoice_date(&self) -> Result<NaiveDate, LlmError> {
        self.output()?.parse_date()
    }
}

impl Task for InvoiceDateTask {
    fn conversation(&self) -> Result<Vec<ChatMessage>, LlmError> {
        if self.invoice.trim().is_empty() {
            return Err(LlmError::Input("invoice text is empty".to_string()));
        }

        let length = self.invoice.chars().count();
        if length > self.config.max_text_length {
            return Err(LlmError::Input(format!(
                "invoice text too long: {} chars (max: {})",
                length, self.config.max_text_length
            )));
        }

        debug!("Invoice text length: {} chars", length);
        Ok(PromptBuilder::invoice_date(self.invoice.as_str()).build())
    }

    fn output_schema(&self) -> Option<OutputSchema> {
        let mut schema = OutputSchema::new();
        schema.insert(
            DATE_FIELD.to_string(),
            FieldDescriptor::string("The creation date of the invoice"),
        );
        Some(schema)
    }

    fn max_tokens(&self) -> u32 {
        self.config.max_tokens
    }

    fn attach_response(&mut self, response: NormalizedResponse) {
        self.response = Some(response);
    }

    fn response(&self) -> Option<&NormalizedResponse> {
        self.response.as_ref()
    }
}
