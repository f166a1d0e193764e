//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::pipeline::RunReport;
use chrono::NaiveDate;
use colored::*;
use serde_json::{json, Map, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the outcome of a pipeline run.
    pub fn format_report(&self, report: &RunReport, dry_run: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "dry_run": dry_run,
                "filed": report.filed,
                "skipped": report.skipped,
                "failures": report.failures,
            }))?),
            OutputFormat::Table => Ok(self.format_report_table(report, dry_run)),
            OutputFormat::Quiet => Ok(report
                .filed
                .iter()
                .map(|f| f.path.display().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_report_table(&self, report: &RunReport, dry_run: bool) -> String {
        let mut sections = Vec::new();

        if report.filed.is_empty() && report.failures.is_empty() {
            sections.push(self.colorize("No invoices found.", "yellow"));
        }

        if !report.filed.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["File", "Date", "Filed to"]);
            for filed in &report.filed {
                builder.push_record([
                    filed.filename.clone(),
                    filed.invoice_date.to_string(),
                    filed.path.display().to_string(),
                ]);
            }
            sections.push(styled(builder));
        }

        if !report.failures.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["File", "Error"]);
            for failure in &report.failures {
                builder.push_record([failure.filename.as_str(), failure.error.as_str()]);
            }
            sections.push(styled(builder));
        }

        let verb = if dry_run { "Would file" } else { "Filed" };
        let summary = format!(
            "{} {} invoice(s), {} failed, {} skipped",
            verb,
            report.filed.len(),
            report.failures.len(),
            report.skipped
        );
        sections.push(if report.is_clean() {
            self.success(&summary)
        } else {
            self.error(&summary)
        });

        sections.join("\n")
    }

    /// Format the date read from one invoice.
    pub fn format_invoice_date(&self, file: &str, date: NaiveDate) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "file": file,
                "date": date,
            }))?),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["File", "Date"]);
                builder.push_record([file.to_string(), date.to_string()]);
                Ok(styled(builder))
            }
            OutputFormat::Quiet => Ok(date.to_string()),
        }
    }

    /// Format custom extracted fields.
    pub fn format_fields(&self, fields: &Map<String, Value>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
            OutputFormat::Table => {
                if fields.is_empty() {
                    return Ok(self.colorize("No fields extracted.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (name, value) in fields {
                    builder.push_record([name.clone(), display_value(value)]);
                }
                Ok(styled(builder))
            }
            OutputFormat::Quiet => {
                Ok(fields.values().map(display_value).collect::<Vec<_>>().join("\n"))
            }
        }
    }

    /// Format a free-form model reply.
    pub fn format_reply(&self, text: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "text": text }))?),
            OutputFormat::Table | OutputFormat::Quiet => Ok(text.to_string()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{DocumentFailure, FiledInvoice};
    use std::path::PathBuf;

    fn report() -> RunReport {
        RunReport {
            filed: vec![FiledInvoice {
                message_id: "1".into(),
                filename: "FV_7.pdf".into(),
                invoice_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                path: PathBuf::from("/docs/2024/dokumenty_marzec/FV_7.pdf"),
            }],
            skipped: 2,
            failures: vec![DocumentFailure {
                message_id: "2".into(),
                filename: "scan.pdf".into(),
                error: "Document contains no text".into(),
            }],
        }
    }

    #[test]
    fn test_report_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&report(), false).unwrap();
        assert!(output.contains("Filed to"));
        assert!(output.contains("2024-03-07"));
        assert!(output.contains("Document contains no text"));
        assert!(output.contains("✗ Filed 1 invoice(s), 1 failed, 2 skipped"));
    }

    #[test]
    fn test_report_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_report(&report(), true).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["dry_run"], true);
        assert_eq!(value["filed"][0]["invoice_date"], "2024-03-07");
        assert_eq!(value["failures"][0]["filename"], "scan.pdf");
    }

    #[test]
    fn test_report_quiet_lists_paths() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_report(&report(), false).unwrap();
        assert_eq!(output, "/docs/2024/dokumenty_marzec/FV_7.pdf");
    }

    #[test]
    fn test_empty_report() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&RunReport::default(), false).unwrap();
        assert!(output.contains("No invoices found"));
        assert!(output.contains("✓ Filed 0 invoice(s)"));
    }

    #[test]
    fn test_fields_table_and_quiet() {
        let mut fields = Map::new();
        fields.insert("total".into(), json!(123.45));
        fields.insert("vendor".into(), json!("ACME"));

        let table = Formatter::new(OutputFormat::Table, false).format_fields(&fields).unwrap();
        assert!(table.contains("ACME"));
        assert!(table.contains("123.45"));

        let quiet = Formatter::new(OutputFormat::Quiet, false).format_fields(&fields).unwrap();
        assert_eq!(quiet, "123.45\nACME");
    }

    #[test]
    fn test_invoice_date_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(formatter.format_invoice_date("a.pdf", date).unwrap(), "2024-03-07");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("careful"), "⚠ careful");
    }
}
