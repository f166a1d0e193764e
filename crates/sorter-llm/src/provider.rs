//! Provider abstraction shared by the real client and the mock

use crate::error::LlmError;
use crate::message::{ChatMessage, NormalizedResponse};
use crate::schema::OutputSchema;
use async_trait::async_trait;
use tracing::warn;

/// Runs tasks and free-form chats against an LLM backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Perform one round-trip for `task` and attach the reply to it
    ///
    /// Nothing is attached when the call fails.
    async fn run_task(&self, task: &mut dyn crate::Task) -> Result<NormalizedResponse, LlmError>;

    /// Plain chat call without any tool machinery
    async fn ask_chat(&self, messages: Vec<ChatMessage>) -> Result<NormalizedResponse, LlmError>;

    /// Model identifier used for requests
    fn model(&self) -> &str;
}

/// The output schema a task declared, treating an empty map as absent
pub(crate) fn declared_schema(task: &dyn crate::Task) -> Option<OutputSchema> {
    task.output_schema().filter(|schema| !schema.is_empty())
}

/// Reject requests the API would refuse before anything is sent
pub(crate) fn check_request(messages: &[ChatMessage], max_tokens: u32) -> Result<(), LlmError> {
    if messages.is_empty() {
        return Err(LlmError::Input("conversation is empty".to_string()));
    }
    if max_tokens == 0 {
        return Err(LlmError::Input("max_tokens must be greater than 0".to_string()));
    }
    Ok(())
}

/// Check a reply against what the request asked for
///
/// Structured requests must yield structured replies restricted to the
/// declared fields; plain requests must yield messages.
pub(crate) fn reconcile(
    declared: Option<&OutputSchema>,
    response: NormalizedResponse,
) -> Result<NormalizedResponse, LlmError> {
    match (declared, response) {
        (Some(schema), NormalizedResponse::Structured { mut fields }) => {
            let dropped = fields.retain_fields(|name| schema.contains_key(name));
            if !dropped.is_empty() {
                warn!(?dropped, "Dropping undeclared fields from structured output");
            }
            Ok(NormalizedResponse::Structured { fields })
        }
        (Some(_), NormalizedResponse::Message { .. }) => Err(LlmError::Protocol(
            "expected a tool_use reply to a structured request".to_string(),
        )),
        (None, NormalizedResponse::Structured { .. }) => Err(LlmError::Protocol(
            "unexpected tool_use reply to a plain chat request".to_string(),
        )),
        (None, message @ NormalizedResponse::Message { .. }) => Ok(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Role, StructuredOutput};
    use crate::schema::FieldDescriptor;
    use serde_json::{json, Value};

    fn structured(value: Value) -> NormalizedResponse {
        match value {
            Value::Object(map) => NormalizedResponse::Structured {
                fields: StructuredOutput::new(map),
            },
            _ => panic!("fixture must be an object"),
        }
    }

    fn date_schema() -> OutputSchema {
        let mut schema = OutputSchema::new();
        schema.insert("date".to_string(), FieldDescriptor::string("Issue date"));
        schema
    }

    #[test]
    fn test_reconcile_keeps_declared_fields_only() {
        let schema = date_schema();
        let reply = structured(json!({"date": "2024-03-07", "vendor": "ACME"}));
        let response = reconcile(Some(&schema), reply).unwrap();
        let fields = response.structured().unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["date"]);
    }

    #[test]
    fn test_reconcile_rejects_shape_mismatch() {
        let schema = date_schema();
        let message = NormalizedResponse::Message {
            role: Role::Assistant,
            text: "2024-03-07".to_string(),
        };
        assert!(matches!(
            reconcile(Some(&schema), message.clone()),
            Err(LlmError::Protocol(_))
        ));
        assert!(matches!(
            reconcile(None, structured(json!({"date": "x"}))),
            Err(LlmError::Protocol(_))
        ));
        assert_eq!(reconcile(None, message.clone()).unwrap(), message);
    }

    #[test]
    fn test_check_request() {
        let hi = vec![ChatMessage::user("hi")];
        assert!(check_request(&hi, 1).is_ok());
        assert!(matches!(check_request(&[], 1), Err(LlmError::Input(_))));
        assert!(matches!(
            check_request(&hi, 0),
            Err(LlmError::Input(ref msg)) if msg == "max_tokens must be greater than 0"
        ));
    }
}
