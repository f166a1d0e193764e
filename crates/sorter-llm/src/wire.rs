//! Messages API request and response bodies

use crate::message::{ChatMessage, Role};
use crate::schema::ToolSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the single tool attached to structured requests
pub const TOOL_NAME: &str = "data_extractor";

/// Description of the single tool attached to structured requests
pub const TOOL_DESCRIPTION: &str = "extract the data to the exact provided format";

/// Request body for `POST /v1/messages/`
#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    /// Model identifier
    pub model: String,
    /// Generation budget
    pub max_tokens: u32,
    /// Ordered conversation
    pub messages: Vec<ChatMessage>,
    /// Forced tool selection, only with `tools`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Tool definitions, omitted for plain chat
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

impl MessagesRequest {
    /// Plain chat request without tools
    pub fn chat(model: impl Into<String>, max_tokens: u32, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            messages,
            tool_choice: None,
            tools: Vec::new(),
        }
    }

    /// Attach the extractor tool and force the model to call it
    pub fn with_extractor_tool(
        mut self,
        input_schema: ToolSchema,
        disable_parallel_tool_use: bool,
    ) -> Self {
        self.tool_choice = Some(ToolChoice {
            choice_type: "tool",
            name: TOOL_NAME.to_string(),
            disable_parallel_tool_use,
        });
        self.tools = vec![ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            input_schema,
        }];
        self
    }

    /// True when a tool call is being forced
    pub fn is_structured(&self) -> bool {
        self.tool_choice.is_some()
    }
}

/// `tool_choice` object
#[derive(Debug, Clone, Serialize)]
pub struct ToolChoice {
    /// Always `"tool"`: a specific tool must be used
    #[serde(rename = "type")]
    pub choice_type: &'static str,
    /// Tool the model must call
    pub name: String,
    /// Whether the provider may emit several tool calls at once
    pub disable_parallel_tool_use: bool,
}

/// One entry of `tools`
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// Compiled input schema
    pub input_schema: ToolSchema,
}

/// Response envelope; only `content[0]` and `role` drive behavior
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    /// Provider message id
    #[serde(default)]
    pub id: Option<String>,
    /// Role of the reply
    #[serde(default)]
    pub role: Option<Role>,
    /// Model that produced the reply
    #[serde(default)]
    pub model: Option<String>,
    /// Content blocks
    pub content: Vec<RawContentBlock>,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token accounting
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Undecoded content block, as received
#[derive(Debug, Clone, Deserialize)]
pub struct RawContentBlock {
    /// Kind tag (`text`, `tool_use`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Text of a `text` block
    #[serde(default)]
    pub text: Option<String>,
    /// Tool-use id
    #[serde(default)]
    pub id: Option<String>,
    /// Tool name of a `tool_use` block
    #[serde(default)]
    pub name: Option<String>,
    /// Tool input of a `tool_use` block
    #[serde(default)]
    pub input: Option<Value>,
}

/// Token usage reported by the provider
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    #[serde(default)]
    pub input_tokens: u64,
    /// Generated tokens
    #[serde(default)]
    pub output_tokens: u64,
}
