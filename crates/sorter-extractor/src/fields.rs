//! Extraction of caller-defined fields

use crate::config::ExtractorConfig;
use crate::prompt::PromptBuilder;
use serde_json::{Map, Value};
use sorter_llm::{
    parse_output_schema, ChatMessage, LlmError, NormalizedResponse, OutputSchema, StructuredOutput,
    Task,
};
use tracing::debug;

const DEFAULT_INSTRUCTIONS: &str = "You're a specialist in analysing business documents. \
Extract the requested fields from the document.";

/// Task extracting an arbitrary set of declared fields from a document
#[derive(Debug, Clone)]
pub struct DocumentFieldsTask {
    document: String,
    schema: OutputSchema,
    instructions: String,
    config: ExtractorConfig,
    response: Option<NormalizedResponse>,
}

impl DocumentFieldsTask {
    /// Create a task for `document` with a typed schema
    pub fn new(document: impl Into<String>, schema: OutputSchema) -> Self {
        Self {
            document: document.into(),
            schema,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            config: ExtractorConfig::default(),
            response: None,
        }
    }

    /// Create a task from an untyped `{field: {type, description}}` map
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Schema`] naming the first malformed descriptor.
    pub fn from_schema_json(document: impl Into<String>, schema: &Value) -> Result<Self, LlmError> {
        Ok(Self::new(document, parse_output_schema(schema)?))
    }

    /// Replace the framing instructions
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Replace the limits
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Declared schema
    pub fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    /// Structured output of the attached response
    pub fn output(&self) -> Result<&StructuredOutput, LlmError> {
        match &self.response {
            Some(NormalizedResponse::Structured { fields }) => Ok(fields),
            Some(NormalizedResponse::Message { .. }) => Err(LlmError::Extraction {
                field: "<all>".to_string(),
                reason: "expected structured output, got a message".to_string(),
            }),
            None => Err(LlmError::Extraction {
                field: "<all>".to_string(),
                reason: "no response attached".to_string(),
            }),
        }
    }

    /// Every declared field, failing on the first one the model left out or
    /// returned with a type other than the declared one
    pub fn values(&self) -> Result<Map<String, Value>, LlmError> {
        let output = self.output()?;
        let mut values = Map::new();
        for (name, descriptor) in &self.schema {
            let value = output.get_typed(name, descriptor.field_type)?;
            values.insert(name.clone(), value.clone());
        }
        Ok(values)
    }
}

impl Task for DocumentFieldsTask {
    fn conversation(&self) -> Result<Vec<ChatMessage>, LlmError> {
        if self.document.trim().is_empty() {
            return Err(LlmError::Input("document text is empty".to_string()));
        }
        let length = self.document.chars().count();
        if length > self.config.max_text_length {
            return Err(LlmError::Input(format!(
                "document text too long: {} chars (max: {})",
                length, self.config.max_text_length
            )));
        }
        debug!("Document text length: {} chars, {} field(s)", length, self.schema.len());
        Ok(PromptBuilder::new(self.instructions.clone(), self.document.as_str()).build())
    }

    fn output_schema(&self) -> Option<OutputSchema> {
        Some(self.schema.clone())
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
