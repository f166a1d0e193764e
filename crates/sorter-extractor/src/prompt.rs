//! Conversation builders for extraction tasks

use sorter_llm::ChatMessage;

/// Builds the two-turn conversation sent for a document
///
/// The first turn frames the model's role, the second carries the document
/// wrapped in a tag plus an optional answer-format reminder.
pub struct PromptBuilder {
    instructions: String,
    document: String,
    tag: String,
    answer_format: Option<String>,
}

impl PromptBuilder {
    /// Create a prompt builder for an arbitrary document
    pub fn new(instructions: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            document: document.into(),
            tag: "document".to_string(),
            answer_format: None,
        }
    }

    /// Prompt asking for an invoice's creation date
    pub fn invoice_date(invoice: impl Into<String>) -> Self {
        Self::new(INVOICE_DATE_INSTRUCTIONS, invoice)
            .with_tag("invoice")
            .with_answer_format(INVOICE_DATE_FORMAT)
    }

    /// Tag wrapping the document text
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Reminder appended after the document
    pub fn with_answer_format(mut self, format: impl Into<String>) -> Self {
        self.answer_format = Some(format.into());
        self
    }

    /// Build the conversation
    pub fn build(&self) -> Vec<ChatMessage> {
        let mut body = String::new();
        body.push_str(&format!("Analyze the following {}:\n", self.tag));
        body.push_str(&format!("<{}>\n", self.tag));
        body.push_str(self.document.trim());
        body.push_str(&format!("\n</{}>\n", self.tag));

        if let Some(format) = &self.answer_format {
            body.push('\n');
            body.push_str(format);
        }

        vec![
            ChatMessage::user(self.instructions.clone()),
            ChatMessage::user(body),
        ]
    }
}

const INVOICE_DATE_INSTRUCTIONS: &str = "You're a specialist in analysing invoices and you're \
given the task of extracting the creation date of the invoice.";

const INVOICE_DATE_FORMAT: &str = "Return the date in the following format 'YYYY-MM-DD'";
