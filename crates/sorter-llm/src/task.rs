//! The task capability contract
//!
//! A task is one unit of work sent to a provider. It builds the
//! conversation, optionally declares the structured fields it wants back,
//! and receives the normalized reply once the round-trip succeeds.
//! Concrete tasks live in `sorter-extractor`; providers only see this trait.

use crate::error::LlmError;
use crate::message::{ChatMessage, NormalizedResponse};
use crate::schema::OutputSchema;

/// Token budget used when a task does not declare one
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Capabilities every task exposes to a provider
pub trait Task: Send {
    /// Build the ordered conversation to send
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Input`] when the task's own input is absent or
    /// invalid. Nothing is sent in that case.
    fn conversation(&self) -> Result<Vec<ChatMessage>, LlmError>;

    /// Fields to force through a tool call; `None` means a plain chat call
    fn output_schema(&self) -> Option<OutputSchema> {
        None
    }

    /// Maximum tokens the provider may generate
    fn max_tokens(&self) -> u32 {
        DEFAULT_MAX_TOKENS
    }

    /// Store the reply of a successful round-trip, replacing any prior one
    fn attach_response(&mut self, response: NormalizedResponse);

    /// The attached reply, if a round-trip has succeeded
    fn response(&self) -> Option<&NormalizedResponse>;
}

/// Task wrapping a fixed conversation with no output schema
///
/// Used by providers to implement free-form chat on top of [`Task`].
#[derive(Debug, Clone, Default)]
pub struct ChatTask {
    messages: Vec<ChatMessage>,
    max_tokens: Option<u32>,
    response: Option<NormalizedResponse>,
}

impl ChatTask {
    /// Create a chat task from an existing conversation
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: None,
            response: None,
        }
    }

    /// Override the token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl Task for ChatTask {
    fn conversation(&self) -> Result<Vec<ChatMessage>, LlmError> {
        if self.messages.is_empty() {
            return Err(LlmError::Input("conversation is empty".to_string()));
        }
        Ok(self.messages.clone())
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    fn attach_response(&mut self, response: NormalizedResponse) {
        self.response = Some(response);
    }

    fn response(&self) -> Option<&NormalizedResponse> {
        self.response.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn test_chat_task_defaults() {
        let task = ChatTask::new(vec![ChatMessage::user("hi")]);
        assert_eq!(task.max_tokens(), DEFAULT_MAX_TOKENS);
        assert!(task.output_schema().is_none());
        assert!(task.response().is_none());
    }

    #[test]
    fn test_chat_task_empty_conversation() {
        let task = ChatTask::new(Vec::new());
        assert!(matches!(task.conversation(), Err(LlmError::Input(_))));
    }

    #[test]
    fn test_attach_overwrites() {
        let mut task = ChatTask::new(vec![ChatMessage::user("hi")]).with_max_tokens(16);
        assert_eq!(task.max_tokens(), 16);

        task.attach_response(NormalizedResponse::Message {
            role: Role::Assistant,
            text: "first".to_string(),
        });
        task.attach_response(NormalizedResponse::Message {
            role: Role::Assistant,
            text: "second".to_string(),
        });
        assert_eq!(task.response().and_then(|r| r.text()), Some("second"));
    }
}
