//! PDF-to-text conversion.

use crate::config::{PdfSettings, INPUT_PLACEHOLDER};
use crate::error::{CliError, Result};
use async_trait::async_trait;
use std::io::Write;
use tokio::process::Command;
use tracing::debug;

/// Turns document bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text of one document.
    async fn extract(&self, content: &[u8]) -> Result<String>;
}

/// Runs an external program on a temporary copy of the document and reads its stdout.
#[derive(Debug, Clone)]
pub struct CommandTextExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandTextExtractor {
    /// Run `program` with `args`; `{input}` in an argument is replaced by the file path.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from the `[pdf]` config section.
    pub fn from_settings(settings: &PdfSettings) -> Self {
        Self::new(settings.program.clone(), settings.args.clone())
    }

    fn render_args(&self, input: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(INPUT_PLACEHOLDER, input))
            .collect()
    }
}

impl Default for CommandTextExtractor {
    fn default() -> Self {
        Self::from_settings(&PdfSettings::default())
    }
}

#[async_trait]
impl TextExtractor for CommandTextExtractor {
    async fn extract(&self, content: &[u8]) -> Result<String> {
        let mut file = tempfile::Builder::new().prefix("invoice-").suffix(".pdf").tempfile()?;
        file.write_all(content)?;
        file.flush()?;

        let input = file.path().to_string_lossy().into_owned();
        let args = self.render_args(&input);
        debug!(program = %self.program, ?args, "Extracting text");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                CliError::TextExtraction(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CliError::TextExtraction(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(CliError::TextExtraction("Document contains no text".into()));
        }

        Ok(text)
    }
}
