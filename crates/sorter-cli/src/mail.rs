//! Incoming mail and its attachments.

use crate::error::{CliError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use std::path::PathBuf;
use tracing::debug;

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name as sent
    pub filename: String,
    /// Raw bytes
    pub content: Vec<u8>,
}

impl Attachment {
    /// Create an attachment.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    /// Whether the file name ends in `.pdf`, ignoring case.
    pub fn is_pdf(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// One fetched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Source-specific identifier
    pub id: String,
    /// Attachments in the order they appear
    pub attachments: Vec<Attachment>,
}

/// Somewhere invoices arrive.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Messages received on or after `since`.
    async fn fetch(&self, since: NaiveDate) -> Result<Vec<MailMessage>>;
}

/// A local mail drop: every regular file in a directory is a one-attachment message.
#[derive(Debug, Clone)]
pub struct DirectoryMailSource {
    inbox_dir: PathBuf,
}

impl DirectoryMailSource {
    /// Read from the given directory.
    pub fn new(inbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            inbox_dir: inbox_dir.into(),
        }
    }

    /// The directory being read.
    pub fn inbox_dir(&self) -> &std::path::Path {
        &self.inbox_dir
    }
}

#[async_trait]
impl MailSource for DirectoryMailSource {
    async fn fetch(&self, since: NaiveDate) -> Result<Vec<MailMessage>> {
        let mut entries = tokio::fs::read_dir(&self.inbox_dir).await.map_err(|e| {
            CliError::Mail(format!("Cannot read inbox {}: {}", self.inbox_dir.display(), e))
        })?;

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let received: DateTime<Local> = metadata.modified()?.into();
            if received.date_naive() < since {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().into_owned();
            found.push((filename, entry.path()));
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));

        let mut messages = Vec::with_capacity(found.len());
        for (filename, path) in found {
            let content = tokio::fs::read(&path).await?;
            debug!(file = %filename, bytes = content.len(), "Picked up mail drop file");
            messages.push(MailMessage {
                id: filename.clone(),
                attachments: vec![Attachment::new(filename, content)],
            });
        }

        Ok(messages)
    }
}
