//! Configuration for extraction tasks

use serde::{Deserialize, Serialize};
use sorter_llm::DEFAULT_MAX_TOKENS;

/// Configuration shared by the extraction tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum document text length (characters)
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Generation budget per task
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Compact preset: small documents, small replies
    pub fn compact() -> Self {
        Self {
            max_text_length: 20_000,
            max_tokens: 1024,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_max_text_length() -> usize {
    100_000
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
