//! Invoice Sorter LLM Layer
//!
//! Structured-extraction client for the Anthropic Messages API.
//!
//! # Architecture
//!
//! ```text
//! Task ─► LlmProvider::run_task ─► compile_schema ─► POST /v1/messages/
//!   ▲                                                      │
//!   └──── attach_response ◄── normalize (content[0]) ◄─────┘
//! ```
//!
//! A [`Task`] produces the conversation and optionally declares the fields
//! it wants back. When it does, the provider compiles them into a single
//! forced `data_extractor` tool and the reply comes back as
//! [`NormalizedResponse::Structured`]; otherwise it is a
//! [`NormalizedResponse::Message`].
//!
//! # Providers
//!
//! - [`AnthropicClient`]: HTTP client for the real API
//! - [`MockProvider`]: deterministic mock for testing
//!
//! # Examples
//!
//! ```
//! use sorter_llm::{ChatMessage, ChatTask, LlmProvider, MockProvider, Task};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::text("Hello from LLM!");
//! let mut task = ChatTask::new(vec![ChatMessage::user("hi")]);
//! provider.run_task(&mut task).await.unwrap();
//! assert_eq!(task.response().and_then(|r| r.text()), Some("Hello from LLM!"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod config;
mod error;
pub mod message;
pub mod mock;
pub mod normalize;
mod provider;
pub mod schema;
pub mod task;
pub mod wire;

pub use anthropic::AnthropicClient;
pub use config::AnthropicConfig;
pub use error::LlmError;
pub use message::{ChatMessage, NormalizedResponse, Role, StructuredOutput};
pub use mock::{MockProvider, RecordedCall};
pub use provider::LlmProvider;
pub use schema::{
    compile_schema, parse_output_schema, FieldDescriptor, FieldType, OutputSchema, ToolSchema,
};
pub use task::{ChatTask, Task, DEFAULT_MAX_TOKENS};
