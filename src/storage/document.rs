//! Markdown documents on disk
//!
//! A document is read whole into a [`Document`] buffer, edited in memory,
//! and written back atomically (temp file + rename).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::{Document, TextBuffer};

/// Reads a file into a buffer associated with its path
pub fn load_document(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;

    Ok(Document::new(text).with_path(path))
}

/// Writes a buffer back to the file it was loaded from
pub fn save_document(document: &Document) -> Result<()> {
    let path = document
        .file_path()
        .ok_or_else(|| anyhow::anyhow!("Document has no file path"))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid document path: {}", path.display()))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    // Write to temp file first
    fs::write(&temp_path, document.text())
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

    // Atomic rename
    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
