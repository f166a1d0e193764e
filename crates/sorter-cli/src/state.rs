//! Persisted date of the last successful run.

use crate::error::{CliError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of the state file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Day of the last run that filed everything it found
    pub last_run: NaiveDate,
}

/// Reads and writes [`RunState`] as JSON.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The saved state, or `None` before the first run.
    pub fn load(&self) -> Result<Option<RunState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| CliError::State(format!("Cannot read {}: {}", self.path.display(), e)))?;
        let state = serde_json::from_str(&contents).map_err(|e| {
            CliError::State(format!("Corrupt state file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(state))
    }

    /// Record `last_run`.
    pub fn save(&self, last_run: NaiveDate) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&RunState { last_run })?;
        fs::write(&self.path, contents)
            .map_err(|e| CliError::State(format!("Cannot write {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}
