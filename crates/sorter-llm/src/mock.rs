//! Deterministic provider for tests
//!
//! Returns pre-configured replies without making any network calls, while
//! honoring the same task contract as the real client: the conversation is
//! built, the schema is compiled, and replies are attached only on success.

use crate::error::LlmError;
use crate::message::{ChatMessage, NormalizedResponse, Role, StructuredOutput};
use crate::provider::{check_request, declared_schema, reconcile, LlmProvider};
use crate::schema::{compile_schema, OutputSchema};
use crate::task::Task;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Canned outcome for one call
#[derive(Debug, Clone)]
enum MockReply {
    Response(NormalizedResponse),
    Malformed(String),
    Http { status: u16, body: String },
    Transport(String),
}

/// A call the mock received
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Conversation that would have been sent
    pub messages: Vec<ChatMessage>,
    /// Declared output schema, if any
    pub schema: Option<OutputSchema>,
    /// Token budget
    pub max_tokens: u32,
}

/// Mock LLM provider for deterministic testing
///
/// # Examples
///
/// ```
/// use sorter_llm::{ChatMessage, LlmProvider, MockProvider};
///
/// # tokio_test::block_on(async {
/// let provider = MockProvider::text("Fixed response");
/// let reply = provider.ask_chat(vec![ChatMessage::user("any prompt")]).await.unwrap();
/// assert_eq!(reply.text(), Some("Fixed response"));
/// assert_eq!(provider.call_count(), 1);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: MockReply,
    queued: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Mock answering every call with `response`
    pub fn new(response: NormalizedResponse) -> Self {
        Self {
            default_reply: MockReply::Response(response),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock answering every call with an assistant message
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NormalizedResponse::Message {
            role: Role::Assistant,
            text: text.into(),
        })
    }

    /// Mock answering every call with structured fields
    ///
    /// `fields` must be a JSON object; anything else makes every call fail
    /// with a protocol error naming the bad fixture.
    pub fn structured(fields: Value) -> Self {
        Self {
            default_reply: structured_reply(fields),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply consumed before the default one
    pub fn push_response(&self, response: NormalizedResponse) {
        lock(&self.queued).push_back(MockReply::Response(response));
    }

    /// Queue structured fields consumed before the default reply
    pub fn push_structured(&self, fields: Value) {
        lock(&self.queued).push_back(structured_reply(fields));
    }

    /// Queue a non-2xx status
    pub fn push_http_error(&self, status: u16, body: impl Into<String>) {
        lock(&self.queued).push_back(MockReply::Http {
            status,
            body: body.into(),
        });
    }

    /// Queue a transport failure
    pub fn push_transport_error(&self, message: impl Into<String>) {
        lock(&self.queued).push_back(MockReply::Transport(message.into()));
    }

    /// Number of calls that reached the transport stage
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls
    pub fn reset_call_count(&self) {
        lock(&self.calls).clear();
    }

    fn next_reply(&self, call: RecordedCall) -> Result<NormalizedResponse, LlmError> {
        lock(&self.calls).push(call);

        let reply = lock(&self.queued)
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::Malformed(message) => Err(LlmError::Protocol(message)),
            MockReply::Http { status, body } => Err(LlmError::Http { status, body }),
            MockReply::Transport(message) => Err(LlmError::Transport(message)),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::text("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn run_task(&self, task: &mut dyn Task) -> Result<NormalizedResponse, LlmError> {
        let messages = task.conversation()?;
        let max_tokens = task.max_tokens();
        check_request(&messages, max_tokens)?;

        let declared = declared_schema(&*task);
        if let Some(schema) = &declared {
            compile_schema(schema)?;
        }

        let call = RecordedCall {
            messages,
            schema: declared.clone(),
            max_tokens,
        };

        let response = reconcile(declared.as_ref(), self.next_reply(call)?)?;
        task.attach_response(response.clone());
        Ok(response)
    }

    async fn ask_chat(&self, messages: Vec<ChatMessage>) -> Result<NormalizedResponse, LlmError> {
        check_request(&messages, crate::task::DEFAULT_MAX_TOKENS)?;
        self.next_reply(RecordedCall {
            messages,
            schema: None,
            max_tokens: crate::task::DEFAULT_MAX_TOKENS,
        })
    }

    fn model(&self) -> &str {
        "mock"
    }
}

fn structured_reply(fields: Value) -> MockReply {
    match fields {
        Value::Object(map) => MockReply::Response(NormalizedResponse::Structured {
            fields: StructuredOutput::new(map),
        }),
        other => MockReply::Malformed(format!(
            "mock structured fixture must be a JSON object, got {}",
            other
        )),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
