//! Append-only archive file
//!
//! Completed items are appended under an exclusive lock. The file is never
//! rewritten.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::ArchivePlan;

/// Writer for the archive file
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the plan's lines, each followed by the plan's line ending.
    ///
    /// Returns the number of lines written. Callers must only edit the
    /// source document after this succeeds.
    pub fn append(&self, plan: &ArchivePlan) -> Result<usize> {
        if plan.is_empty() {
            return Ok(0);
        }

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open archive: {}", self.path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire write lock on archive")?;

        let mut writer = BufWriter::new(&file);
        writer
            .write_all(plan.append_text().as_bytes())
            .context("Failed to write archive")?;
        writer.flush().context("Failed to flush archive")?;

        // Lock is released when file is dropped
        Ok(plan.append_lines.len())
    }
}
