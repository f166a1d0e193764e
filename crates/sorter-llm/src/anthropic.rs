//! Anthropic Messages API provider
//!
//! Sends one `POST {base_url}/v1/messages/` per task. Structured tasks get
//! a single forced `data_extractor` tool built from their output schema;
//! plain tasks are sent as ordinary chat.
//!
//! # Features
//!
//! - Async HTTP via `reqwest` with explicit request and connect timeouts
//! - Non-2xx replies surface as [`LlmError::Http`] with the body verbatim
//! - No retries: every failure is terminal for the call
//!
//! # Examples
//!
//! ```no_run
//! use sorter_llm::{AnthropicClient, AnthropicConfig, ChatMessage, LlmProvider};
//!
//! # async fn example() -> Result<(), sorter_llm::LlmError> {
//! let client = AnthropicClient::new(AnthropicConfig::new("sk-ant-..."))?;
//! let reply = client.ask_chat(vec![ChatMessage::user("Say hello")]).await?;
//! println!("{}", reply.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::config::AnthropicConfig;
use crate::error::LlmError;
use crate::message::{ChatMessage, NormalizedResponse};
use crate::normalize::{normalize, parse_reply};
use crate::provider::{check_request, declared_schema, reconcile, LlmProvider};
use crate::schema::{compile_schema, OutputSchema};
use crate::task::{Task, DEFAULT_MAX_TOKENS};
use crate::wire::MessagesRequest;
use async_trait::async_trait;
use tracing::{debug, info};

/// Anthropic API client
///
/// Cheap to reuse for sequential calls. Construct one per caller and pass it
/// to every task invocation.
pub struct AnthropicClient {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a client from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Config)?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Access the configuration
    pub fn config(&self) -> &AnthropicConfig {
        &self.config
    }

    /// Build the request body for a task
    ///
    /// Returns the body together with the schema it was built from, so the
    /// reply can be checked against it.
    pub fn build_request(
        &self,
        task: &dyn Task,
    ) -> Result<(MessagesRequest, Option<OutputSchema>), LlmError> {
        let messages = task.conversation()?;
        let max_tokens = task.max_tokens();
        check_request(&messages, max_tokens)?;

        let mut request = MessagesRequest::chat(self.config.model.clone(), max_tokens, messages);

        let declared = declared_schema(task);
        if let Some(schema) = &declared {
            let input_schema = compile_schema(schema)?;
            request = request
                .with_extractor_tool(input_schema, self.config.disable_parallel_tool_use);
        }

        Ok((request, declared))
    }

    /// Send a request and normalize the reply
    async fn send(&self, request: &MessagesRequest) -> Result<NormalizedResponse, LlmError> {
        let url = self.config.messages_url();

        debug!(
            url = %url,
            body = %serde_json::to_string_pretty(request).unwrap_or_default(),
            "Sending request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let reply = parse_reply(&body)?;

        let usage = reply.usage.unwrap_or_default();
        debug!(
            id = reply.id.as_deref().unwrap_or("-"),
            model = reply.model.as_deref().unwrap_or("-"),
            stop_reason = reply.stop_reason.as_deref().unwrap_or("-"),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Received response"
        );

        normalize(&reply)
    }
}

#[async_trait]
impl LlmProvider for AnthropicClient {
    async fn run_task(&self, task: &mut dyn Task) -> Result<NormalizedResponse, LlmError> {
        let (request, declared) = self.build_request(&*task)?;

        info!(
            model = %request.model,
            turns = request.messages.len(),
            structured = request.is_structured(),
            "Running task"
        );

        let response = self.send(&request).await?;
        let response = reconcile(declared.as_ref(), response)?;

        task.attach_response(response.clone());
        Ok(response)
    }

    async fn ask_chat(&self, messages: Vec<ChatMessage>) -> Result<NormalizedResponse, LlmError> {
        check_request(&messages, DEFAULT_MAX_TOKENS)?;

        let request =
            MessagesRequest::chat(self.config.model.clone(), DEFAULT_MAX_TOKENS, messages);
        self.send(&request).await
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
