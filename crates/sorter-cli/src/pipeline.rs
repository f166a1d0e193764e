//! The filing pipeline: mail in, dated invoices out.
//!
//! ```text
//! MailSource ──> PDF attachments ──> TextExtractor ──> InvoiceDateTask
//!                                                          │ LlmProvider::run_task
//!                                                          ▼
//!                                  Filer <── YYYY-MM-DD date
//! ```
//!
//! A document that fails at any step is reported and alerted on; the others
//! are still processed.

use crate::alert::Alerter;
use crate::error::Result;
use crate::filing::Filer;
use crate::mail::{Attachment, MailSource};
use crate::text::TextExtractor;
use chrono::NaiveDate;
use serde::Serialize;
use sorter_extractor::{ExtractorConfig, InvoiceDateTask};
use sorter_llm::LlmProvider;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// One invoice that reached its month folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiledInvoice {
    /// Message the attachment came from
    pub message_id: String,
    /// Attachment file name
    pub filename: String,
    /// Creation date read from the invoice
    pub invoice_date: NaiveDate,
    /// Where it was (or, in a dry run, would be) written
    pub path: PathBuf,
}

/// One invoice that could not be filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    /// Message the attachment came from
    pub message_id: String,
    /// Attachment file name
    pub filename: String,
    /// What went wrong
    pub error: String,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Filed invoices, in processing order
    pub filed: Vec<FiledInvoice>,
    /// Non-PDF attachments that were ignored
    pub skipped: usize,
    /// Invoices that failed
    pub failures: Vec<DocumentFailure>,
}

impl RunReport {
    /// True when every PDF was filed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of PDFs attempted.
    pub fn processed(&self) -> usize {
        self.filed.len() + self.failures.len()
    }
}

/// Wires the mail source, text extraction, the model and the filer together.
pub struct Pipeline<P, M, X, A> {
    provider: P,
    mail: M,
    text: X,
    alerter: A,
    filer: Filer,
    extractor: ExtractorConfig,
}

impl<P, M, X, A> Pipeline<P, M, X, A>
where
    P: LlmProvider,
    M: MailSource,
    X: TextExtractor,
    A: Alerter,
{
    /// Build a pipeline from its collaborators.
    pub fn new(provider: P, mail: M, text: X, alerter: A, filer: Filer) -> Self {
        Self {
            provider,
            mail,
            text,
            alerter,
            filer,
            extractor: ExtractorConfig::default(),
        }
    }

    /// Use the given settings for every invoice task.
    pub fn with_extractor_config(mut self, config: ExtractorConfig) -> Self {
        self.extractor = config;
        self
    }

    /// The alerter failures are reported to.
    pub fn alerter(&self) -> &A {
        &self.alerter
    }

    /// Process every PDF received since the day before `since`.
    pub async fn run(&self, since: NaiveDate) -> Result<RunReport> {
        let fetch_from = since.pred_opt().unwrap_or(since);
        info!(%since, %fetch_from, model = self.provider.model(), "Starting run");

        let messages = self.mail.fetch(fetch_from).await?;
        let mut report = RunReport::default();

        for message in &messages {
            for attachment in &message.attachments {
                if !attachment.is_pdf() {
                    debug!(
                        message = %message.id,
                        file = %attachment.filename,
                        "Skipping non-PDF attachment"
                    );
                    report.skipped += 1;
                    continue;
                }

                match self.file_invoice(attachment).await {
                    Ok((invoice_date, path)) => report.filed.push(FiledInvoice {
                        message_id: message.id.clone(),
                        filename: attachment.filename.clone(),
                        invoice_date,
                        path,
                    }),
                    Err(e) => {
                        error!(
                            message = %message.id,
                            file = %attachment.filename,
                            error = %e,
                            "Failed to file invoice"
                        );
                        self.notify(&format!("Could not file {}: {}", attachment.filename, e))
                            .await;
                        report.failures.push(DocumentFailure {
                            message_id: message.id.clone(),
                            filename: attachment.filename.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            filed = report.filed.len(),
            failed = report.failures.len(),
            skipped = report.skipped,
            "Run finished"
        );
        Ok(report)
    }

    /// Extract, date and file a single PDF.
    pub async fn file_invoice(&self, attachment: &Attachment) -> Result<(NaiveDate, PathBuf)> {
        let text = self.text.extract(&attachment.content).await?;

        let mut task = InvoiceDateTask::with_config(text, self.extractor.clone());
        self.provider.run_task(&mut task).await?;
        let invoice_date = task.invoice_date()?;
        debug!(file = %attachment.filename, %invoice_date, "Read invoice date");

        let path = self.filer.file(attachment, invoice_date)?;
        Ok((invoice_date, path))
    }

    /// Send an alert, logging rather than failing when delivery fails.
    pub async fn notify(&self, message: &str) {
        if let Err(e) = self.alerter.alert(message).await {
            warn!(error = %e, "Failed to deliver alert");
        }
    }
}
