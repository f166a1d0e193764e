//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider or task error
    #[error(transparent)]
    Llm(#[from] sorter_llm::LlmError),

    /// Mail source error
    #[error("Mail error: {0}")]
    Mail(String),

    /// Text extraction error
    #[error("Text extraction error: {0}")]
    TextExtraction(String),

    /// Filing error
    #[error("Filing error: {0}")]
    Filing(String),

    /// Run-state error
    #[error("State error: {0}")]
    State(String),

    /// Alert delivery error
    #[error("Alert error: {0}")]
    Alert(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
