//! Reduce a provider reply to a [`NormalizedResponse`]
//!
//! Only the first content block is inspected. Its kind tag is decoded into a
//! closed [`ContentBlock`]; kinds other than `text` and `tool_use` fail with
//! [`LlmError::Protocol`] rather than producing an empty response.

use crate::error::LlmError;
use crate::message::{NormalizedResponse, Role, StructuredOutput};
use crate::wire::{MessagesResponse, RawContentBlock};
use serde_json::{Map, Value};

/// Decoded content block
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Free text
    Text(String),
    /// Tool input map
    ToolUse(Map<String, Value>),
    /// Any kind this client does not understand
    Unrecognized(String),
}

impl ContentBlock {
    /// Decode a raw block by its kind tag
    pub fn decode(raw: &RawContentBlock) -> Result<Self, LlmError> {
        match raw.kind.as_str() {
            "text" => raw
                .text
                .clone()
                .map(ContentBlock::Text)
                .ok_or_else(|| LlmError::Protocol("text block without text".to_string())),
            "tool_use" => match &raw.input {
                Some(Value::Object(input)) => Ok(ContentBlock::ToolUse(input.clone())),
                Some(_) => Err(LlmError::Protocol("tool_use input is not an object".to_string())),
                None => Err(LlmError::Protocol("tool_use block without input".to_string())),
            },
            other => Ok(ContentBlock::Unrecognized(other.to_string())),
        }
    }
}

/// Decode a reply body
pub fn parse_reply(body: &str) -> Result<MessagesResponse, LlmError> {
    serde_json::from_str(body)
        .map_err(|e| LlmError::Protocol(format!("Failed to decode response: {}", e)))
}

/// Classify the first content block of a decoded reply
pub fn normalize(reply: &MessagesResponse) -> Result<NormalizedResponse, LlmError> {
    let first = reply
        .content
        .first()
        .ok_or_else(|| LlmError::Protocol("response has no content blocks".to_string()))?;

    match ContentBlock::decode(first)? {
        ContentBlock::Text(text) => Ok(NormalizedResponse::Message {
            role: reply.role.unwrap_or(Role::Assistant),
            text,
        }),
        ContentBlock::ToolUse(input) => Ok(NormalizedResponse::Structured {
            fields: StructuredOutput::new(input),
        }),
        ContentBlock::Unrecognized(kind) => Err(LlmError::Protocol(format!(
            "unrecognized content kind '{}'",
            kind
        ))),
    }
}
