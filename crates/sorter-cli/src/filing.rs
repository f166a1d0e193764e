//! Month-folder filing store.

use crate::error::{CliError, Result};
use crate::mail::Attachment;
use chrono::{Datelike, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::info;

/// Polish month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "styczeń",
    "luty",
    "marzec",
    "kwiecień",
    "maj",
    "czerwiec",
    "lipiec",
    "sierpień",
    "wrzesień",
    "październik",
    "listopad",
    "grudzień",
];

/// Writes invoices under `{root}/{year}/{prefix}{month name}`.
#[derive(Debug, Clone)]
pub struct Filer {
    root: PathBuf,
    folder_prefix: String,
    dry_run: bool,
}

impl Filer {
    /// File under `root` with the given month folder prefix.
    pub fn new(root: impl Into<PathBuf>, folder_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            folder_prefix: folder_prefix.into(),
            dry_run: false,
        }
    }

    /// Compute paths without touching the filesystem.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Root of the filing tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether this filer writes anything.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Folder for the month containing `date`.
    pub fn month_dir(&self, date: NaiveDate) -> PathBuf {
        let month = MONTH_NAMES[date.month0() as usize];
        self.root
            .join(date.year().to_string())
            .join(format!("{}{}", self.folder_prefix, month))
    }

    /// Store the attachment in its month folder and return the written path.
    pub fn file(&self, attachment: &Attachment, date: NaiveDate) -> Result<PathBuf> {
        let name = bare_file_name(&attachment.filename)?;
        let dir = self.month_dir(date);
        let target = dir.join(name);

        if self.dry_run {
            info!(path = %target.display(), "Dry run, not writing");
            return Ok(target);
        }

        std::fs::create_dir_all(&dir)
            .map_err(|e| CliError::Filing(format!("Cannot create {}: {}", dir.display(), e)))?;
        std::fs::write(&target, &attachment.content)
            .map_err(|e| CliError::Filing(format!("Cannot write {}: {}", target.display(), e)))?;

        info!(path = %target.display(), "Filed invoice");
        Ok(target)
    }
}

fn bare_file_name(filename: &str) -> Result<&str> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(CliError::Filing(format!("Unusable attachment name '{}'", filename)));
    }
    Ok(name)
}
