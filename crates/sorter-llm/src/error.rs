//! Error types for provider round-trips

use thiserror::Error;

/// Errors that can occur while running a task against a provider
#[derive(Error, Debug)]
pub enum LlmError {
    /// The task's own input is missing or malformed; nothing was sent
    #[error("Invalid task input: {0}")]
    Input(String),

    /// A declared output-schema descriptor is malformed
    #[error("Invalid schema for field '{field}': {reason}")]
    Schema {
        /// Offending field name
        field: String,
        /// What is wrong with the descriptor
        reason: String,
    },

    /// Network or connection failure before a response was obtained
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code returned by the provider
        status: u16,
        /// Response body, verbatim
        body: String,
    },

    /// Reply envelope could not be decoded or classified
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// An expected structured field is absent or has the wrong type
    #[error("Extraction error for field '{field}': {reason}")]
    Extraction {
        /// Field the caller asked for
        field: String,
        /// Why it could not be read
        reason: String,
    },

    /// Client configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LlmError::Schema {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn extraction(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LlmError::Extraction {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True when the provider returned the given HTTP status
    pub fn is_http_status(&self, code: u16) -> bool {
        matches!(self, LlmError::Http { status, .. } if *status == code)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Transport(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            LlmError::Transport(format!("Connection failed: {}", e))
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display_keeps_body() {
        let err = LlmError::Http {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 429: rate limited");
        assert!(err.is_http_status(429));
        assert!(!err.is_http_status(500));
    }

    #[test]
    fn test_schema_error_names_field() {
        let err = LlmError::schema("date", "missing description");
        assert!(err.to_string().contains("'date'"));
        assert!(err.to_string().contains("missing description"));
    }
}
