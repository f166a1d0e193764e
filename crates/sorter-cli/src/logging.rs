//! Tracing subscriber setup.

use crate::config::LoggingSettings;
use crate::error::{CliError, Result};
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber: stderr always, plus daily-rotated files when configured.
///
/// The returned guard flushes the file writer on drop and must be held until
/// the program exits.
pub fn init(verbose: bool, settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let (file_layer, guard) = match &settings.file {
        Some(path) => {
            let (writer, guard) = file_writer(path, settings.max_files)?;
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(guard)
}

/// Non-blocking writer over a daily rolling appender.
///
/// `logs/sorter.log` rolls into `logs/sorter.YYYY-MM-DD.log`, keeping at most
/// `max_files` of them.
pub fn file_writer(path: &Path, max_files: usize) -> Result<(NonBlocking, WorkerGuard)> {
    let prefix = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            CliError::Config(format!("logging.file has no file name: {}", path.display()))
        })?;
    let suffix = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string());

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix(suffix)
        .max_log_files(max_files)
        .build(dir)
        .map_err(|e| CliError::Config(format!("Failed to create log appender: {}", e)))?;

    Ok(tracing_appender::non_blocking(appender))
}
