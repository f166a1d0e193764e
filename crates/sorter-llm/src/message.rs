//! Conversation turns and normalized provider responses

use crate::error::LlmError;
use crate::schema::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Sender of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Turn written by the caller
    User,
    /// Turn written by the model
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One turn of a conversation, serialized as `{role, content}` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent the turn
    pub role: Role,
    /// Plain-text content
    pub content: String,
}

impl ChatMessage {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Field values returned through a forced tool call
///
/// Values keep whatever JSON type the provider produced; the typed getters
/// fail with [`LlmError::Extraction`] instead of coercing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredOutput(Map<String, Value>);

impl StructuredOutput {
    /// Wrap a decoded key/value map
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw value of a field, if present
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Read a string field
    pub fn get_str(&self, field: &str) -> Result<&str, LlmError> {
        let value = self.require(field)?;
        value
            .as_str()
            .ok_or_else(|| mismatch(field, "string", value))
    }

    /// Read a numeric field
    pub fn get_f64(&self, field: &str) -> Result<f64, LlmError> {
        let value = self.require(field)?;
        value
            .as_f64()
            .ok_or_else(|| mismatch(field, "number", value))
    }

    /// Read an integer field
    pub fn get_i64(&self, field: &str) -> Result<i64, LlmError> {
        let value = self.require(field)?;
        value
            .as_i64()
            .ok_or_else(|| mismatch(field, "integer", value))
    }

    /// Read a boolean field
    pub fn get_bool(&self, field: &str) -> Result<bool, LlmError> {
        let value = self.require(field)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(field, "boolean", value))
    }

    /// Raw value of a field, checked against its declared type
    pub fn get_typed(&self, field: &str, field_type: FieldType) -> Result<&Value, LlmError> {
        match field_type {
            FieldType::String => self.get_str(field).map(|_| ()),
            FieldType::Number => self.get_f64(field).map(|_| ()),
            FieldType::Integer => self.get_i64(field).map(|_| ()),
            FieldType::Boolean => self.get_bool(field).map(|_| ()),
        }?;
        self.require(field)
    }

    /// Field names present in the output
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no fields were returned
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Drop every key `keep` rejects, returning the dropped names
    pub(crate) fn retain_fields(&mut self, mut keep: impl FnMut(&str) -> bool) -> Vec<String> {
        let dropped: Vec<String> = self.0.keys().filter(|k| !keep(k)).cloned().collect();
        for key in &dropped {
            self.0.remove(key);
        }
        dropped
    }

    fn require(&self, field: &str) -> Result<&Value, LlmError> {
        self.0
            .get(field)
            .ok_or_else(|| {
                LlmError::extraction(field, "field is absent from the structured output")
            })
    }
}

fn mismatch(field: &str, expected: &str, value: &Value) -> LlmError {
    LlmError::extraction(field, format!("expected {}, got {}", expected, type_name(value)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A provider reply reduced to one of its two useful shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedResponse {
    /// Free-text reply
    Message {
        /// Role the provider reported for the reply
        role: Role,
        /// Reply text
        text: String,
    },
    /// Forced tool-call reply
    Structured {
        /// Decoded tool input
        fields: StructuredOutput,
    },
}

impl NormalizedResponse {
    /// Short tag: `"message"` or `"structured"`
    pub fn kind(&self) -> &'static str {
        match self {
            NormalizedResponse::Message { .. } => "message",
            NormalizedResponse::Structured { .. } => "structured",
        }
    }

    /// Reply text, when this is a message
    pub fn text(&self) -> Option<&str> {
        match self {
            NormalizedResponse::Message { text, .. } => Some(text),
            NormalizedResponse::Structured { .. } => None,
        }
    }

    /// Structured fields, when this is a tool-call reply
    pub fn structured(&self) -> Option<&StructuredOutput> {
        match self {
            NormalizedResponse::Structured { fields } => Some(fields),
            NormalizedResponse::Message { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn output(value: Value) -> StructuredOutput {
        match value {
            Value::Object(map) => StructuredOutput::new(map),
            _ => panic!("test fixture must be an object"),
        }
    }

    #[test]
    fn test_get_typed_checks_declared_type() {
        let out = output(json!({"total": "twelve", "count": 3, "paid": true}));

        assert_eq!(out.get_typed("count", FieldType::Integer).unwrap(), &json!(3));
        assert_eq!(out.get_typed("count", FieldType::Number).unwrap(), &json!(3));
        assert!(out.get_typed("paid", FieldType::Boolean).is_ok());

        match out.get_typed("total", FieldType::Number) {
            Err(LlmError::Extraction { field, reason }) => {
                assert_eq!(field, "total");
                assert_eq!(reason, "expected number, got string");
            }
            other => panic!("Expected extraction error, got {:?}", other),
        }
        assert!(out.get_typed("missing", FieldType::String).is_err());
    }

    #[test]
    fn test_chat_message_wire_shape() {
        let msg = ChatMessage::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_typed_getters() {
        let out = output(json!({"date": "2024-03-07", "total": 12.5, "count": 3, "paid": true}));
        assert_eq!(out.get_str("date").unwrap(), "2024-03-07");
        assert_eq!(out.get_f64("total").unwrap(), 12.5);
        assert_eq!(out.get_i64("count").unwrap(), 3);
        assert!(out.get_bool("paid").unwrap());
    }

    #[test]
    fn test_missing_field_is_extraction_error() {
        let out = output(json!({}));
        match out.get_str("date") {
            Err(LlmError::Extraction { field, .. }) => assert_eq!(field, "date"),
            other => panic!("Expected Extraction error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_is_extraction_error() {
        let out = output(json!({"date": 20240307}));
        let err = out.get_str("date").unwrap_err();
        assert!(err.to_string().contains("expected string, got number"));
    }

    #[test]
    fn test_retain_fields_reports_dropped() {
        let mut out = output(json!({"date": "x", "extra": 1}));
        let dropped = out.retain_fields(|k| k == "date");
        assert_eq!(dropped, vec!["extra".to_string()]);
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["date"]);
    }

    #[test]
    fn test_response_kind() {
        let msg = NormalizedResponse::Message {
            role: Role::Assistant,
            text: "hello".to_string(),
        };
        assert_eq!(msg.kind(), "message");
        assert_eq!(msg.text(), Some("hello"));
        assert!(msg.structured().is_none());

        let structured = NormalizedResponse::Structured {
            fields: StructuredOutput::default(),
        };
        assert_eq!(structured.kind(), "structured");
        assert!(structured.text().is_none());
    }
}
