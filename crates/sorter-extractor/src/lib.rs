//! Invoice Sorter Extractor
//!
//! Concrete [`sorter_llm::Task`] implementations that turn document text into
//! typed values.
//!
//! # Tasks
//!
//! - [`InvoiceDateTask`]: asks for an invoice's creation date and reads it
//!   back as a `YYYY-MM-DD` string or a [`chrono::NaiveDate`]
//! - [`DocumentFieldsTask`]: asks for any caller-declared set of fields
//!
//! # Example Usage
//!
//! ```
//! use sorter_extractor::InvoiceDateTask;
//! use sorter_llm::{LlmProvider, MockProvider};
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::structured(serde_json::json!({"date": "2024-03-07"}));
//! let mut task = InvoiceDateTask::new("FAKTURA VAT 12/03/2024 ...");
//!
//! provider.run_task(&mut task).await.unwrap();
//! assert_eq!(task.output().unwrap().invoice_date, "2024-03-07");
//! # });
//! ```

#![warn(missing_docs)]

mod config;
mod fields;
mod invoice;
mod prompt;


pub use config::ExtractorConfig;
pub use fields::DocumentFieldsTask;
pub use invoice::{InvoiceDateOutput, InvoiceDateTask, DATE_FIELD, DATE_FORMAT};
pub use prompt::PromptBuilder;
