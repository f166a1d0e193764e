//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sorter_extractor::ExtractorConfig;
use sorter_llm::AnthropicConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Default Pushover messages endpoint
pub const DEFAULT_PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// Placeholder replaced by the temporary PDF path in `pdf.args`
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Anthropic client settings
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Extraction task settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Mail drop settings
    #[serde(default)]
    pub mail: MailSettings,

    /// PDF-to-text settings
    #[serde(default)]
    pub pdf: PdfSettings,

    /// Filing store settings
    #[serde(default)]
    pub filing: FilingSettings,

    /// Run-state settings
    #[serde(default)]
    pub state: StateSettings,

    /// Pushover alert settings
    #[serde(default)]
    pub alert: AlertSettings,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Global output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Local mail drop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    /// Directory whose files are treated as incoming attachments
    #[serde(default = "default_inbox_dir")]
    pub inbox_dir: PathBuf,
}

/// External PDF-to-text program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfSettings {
    /// Program to run
    #[serde(default = "default_pdf_program")]
    pub program: String,

    /// Arguments; `{input}` is replaced by the PDF path
    #[serde(default = "default_pdf_args")]
    pub args: Vec<String>,
}

/// Where filed invoices go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingSettings {
    /// Root of the `{year}/{prefix}{month}` tree
    #[serde(default = "default_filing_root")]
    pub root_dir: PathBuf,

    /// Prefix of the month folder name
    #[serde(default = "default_folder_prefix")]
    pub folder_prefix: String,
}

/// Where the last-run date is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSettings {
    /// JSON file path
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

/// Pushover credentials. Alerts only go to the log when either is missing.
#[derive(Clone, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Application token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// User key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_key: Option<String>,

    /// Messages endpoint
    #[serde(default = "default_pushover_endpoint")]
    pub endpoint: String,
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Also log to daily files named after this path (`sorter.log` becomes
    /// `sorter.YYYY-MM-DD.log`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Rotated log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(base_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path, or defaults when it is missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a file, or defaults when it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check the settings every command needs.
    pub fn validate(&self) -> Result<()> {
        self.extractor.validate().map_err(CliError::Config)?;
        if self.pdf.program.trim().is_empty() {
            return Err(CliError::Config("pdf.program must not be empty".into()));
        }
        if !self.pdf.args.iter().any(|arg| arg.contains(INPUT_PLACEHOLDER)) {
            return Err(CliError::Config(format!(
                "pdf.args must contain the {} placeholder",
                INPUT_PLACEHOLDER
            )));
        }
        if self.logging.max_files == 0 {
            return Err(CliError::Config("logging.max_files must be greater than 0".into()));
        }
        if self.filing.folder_prefix.contains(['/', '\\']) {
            return Err(CliError::Config(
                "filing.folder_prefix must not contain path separators".into(),
            ));
        }
        Ok(())
    }

    /// Check the settings needed to talk to the model.
    pub fn validate_anthropic(&self) -> Result<()> {
        self.anthropic
            .validate()
            .map_err(|e| CliError::Config(format!("anthropic: {}", e)))
    }

    /// Apply secrets supplied on the command line or through the environment.
    pub fn apply_secrets(
        &mut self,
        anthropic_key: Option<String>,
        pushover_token: Option<String>,
        pushover_user: Option<String>,
    ) {
        if let Some(key) = anthropic_key {
            self.anthropic.api_key = key;
        }
        if pushover_token.is_some() {
            self.alert.api_token = pushover_token;
        }
        if pushover_user.is_some() {
            self.alert.user_key = pushover_user;
        }
    }
}

impl AlertSettings {
    /// Both credentials, when configured and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.api_token.as_deref(), self.user_key.as_deref()) {
            (Some(token), Some(user)) if !token.is_empty() && !user.is_empty() => {
                Some((token, user))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for AlertSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertSettings")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("user_key", &self.user_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            inbox_dir: default_inbox_dir(),
        }
    }
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            program: default_pdf_program(),
            args: default_pdf_args(),
        }
    }
}

impl Default for FilingSettings {
    fn default() -> Self {
        Self {
            root_dir: default_filing_root(),
            folder_prefix: default_folder_prefix(),
        }
    }
}

impl Default for StateSettings {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            api_token: None,
            user_key: None,
            endpoint: default_pushover_endpoint(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            max_files: default_max_log_files(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".invoice-sorter"))
}

fn home_or_current() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_inbox_dir() -> PathBuf {
    home_or_current().join(".invoice-sorter").join("inbox")
}

fn default_pdf_program() -> String {
    "pdftotext".to_string()
}

fn default_pdf_args() -> Vec<String> {
    vec!["-layout".to_string(), INPUT_PLACEHOLDER.to_string(), "-".to_string()]
}

fn default_filing_root() -> PathBuf {
    home_or_current().join("Documents").join("Firma")
}

fn default_folder_prefix() -> String {
    "dokumenty_".to_string()
}

fn default_state_path() -> PathBuf {
    home_or_current().join(".invoice-sorter").join("state.json")
}

fn default_pushover_endpoint() -> String {
    DEFAULT_PUSHOVER_ENDPOINT.to_string()
}

fn default_max_log_files() -> usize {
    7
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}
