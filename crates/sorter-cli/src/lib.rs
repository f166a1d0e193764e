//! Invoice Sorter CLI library.
//!
//! This library provides the pieces behind the `invoice-sorter` binary:
//! configuration, logging setup, the mail/text/filing/alert collaborators,
//! the filing pipeline and output formatting.

pub mod alert;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod filing;
pub mod logging;
pub mod mail;
pub mod output;
pub mod pipeline;
pub mod state;
pub mod text;

pub use alert::{Alerter, LogAlerter, PushoverAlerter};
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use filing::Filer;
pub use mail::{Attachment, DirectoryMailSource, MailMessage, MailSource};
pub use output::Formatter;
pub use pipeline::{DocumentFailure, FiledInvoice, Pipeline, RunReport};
pub use state::{RunState, StateStore};
pub use text::{CommandTextExtractor, TextExtractor};
