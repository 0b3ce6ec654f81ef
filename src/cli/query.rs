//! Read-only commands: list and status

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;
use crate::domain::{parse_line, Document, Marker};
use crate::storage::{load_document, Project};

/// Which items `list` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Open,
    Done,
}

impl ListFilter {
    pub fn from_flags(open: bool, done: bool) -> Self {
        match (open, done) {
            (true, false) => ListFilter::Open,
            (false, true) => ListFilter::Done,
            _ => ListFilter::All,
        }
    }

    fn accepts(&self, marker: Marker) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Open => marker == Marker::Open,
            ListFilter::Done => marker == Marker::Done,
        }
    }
}

/// One todo item as shown by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedItem {
    /// 1-based line number
    pub line: usize,
    pub state: Marker,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<String>,
}

/// Open / done counts for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemCounts {
    pub open: usize,
    pub done: usize,
}

/// Collects the todo items of a document
pub fn items(document: &Document, filter: ListFilter) -> Vec<ListedItem> {
    document
        .all_lines()
        .iter()
        .filter_map(|line| {
            let parsed = parse_line(&line.text);
            let marker = parsed.marker?;
            filter.accepts(marker).then(|| ListedItem {
                line: line.index() + 1,
                state: marker,
                title: parsed.title(),
                done_at: parsed.done_at.clone(),
            })
        })
        .collect()
}

/// Counts open and done items in a document
pub fn count_items(document: &Document) -> ItemCounts {
    items(document, ListFilter::All)
        .iter()
        .fold(ItemCounts::default(), |mut counts, item| {
            match item.state {
                Marker::Open => counts.open += 1,
                Marker::Done => counts.done += 1,
            }
            counts
        })
}

pub fn list(output: &Output, file: Option<&Path>, filter: ListFilter) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let (project, path) = match file {
        Some(file) => {
            let path = Project::resolve_path(file, &cwd);
            let project = Project::discover(path.parent().unwrap_or(&cwd))?;
            (project, path)
        }
        None => {
            let project = Project::discover(&cwd)?;
            let path = project.files().todo;
            (project, path)
        }
    };

    let document = load_document(&path)?;
    let listed = items(&document, filter);
    output.verbose_ctx("list", &format!("{} item(s) in {}", listed.len(), path.display()));

    if output.is_json() {
        output.data(&serde_json::json!({
            "file": project.display_path(&path),
            "items": listed,
        }));
        return Ok(());
    }

    if listed.is_empty() {
        output.line(&format!("No items in {}", project.display_path(&path)));
        return Ok(());
    }

    for item in &listed {
        let check = match item.state {
            Marker::Open => "[ ]",
            Marker::Done => "[x]",
        };
        match &item.done_at {
            Some(done_at) => output.line(&format!(
                "{:>4}  {} {} (done {})",
                item.line, check, item.title, done_at
            )),
            None => output.line(&format!("{:>4}  {} {}", item.line, check, item.title)),
        }
    }

    Ok(())
}

pub fn status(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let files = project.files();

    let entries = [
        ("todo", &files.todo),
        ("waiting", &files.waiting),
        ("someday", &files.someday),
        ("archive", &files.archive),
    ];

    let mut rows = Vec::new();
    for (label, path) in entries {
        let counts = if path.exists() {
            Some(count_items(&load_document(path)?))
        } else {
            output.verbose_ctx("status", &format!("{} does not exist", path.display()));
            None
        };
        rows.push((label, project.display_path(path), counts));
    }

    if output.is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(label, path, counts)| {
                serde_json::json!({
                    "list": label,
                    "file": path,
                    "exists": counts.is_some(),
                    "open": counts.as_ref().map(|c| c.open).unwrap_or(0),
                    "done": counts.as_ref().map(|c| c.done).unwrap_or(0),
                })
            })
            .collect();
        output.data(&items);
        return Ok(());
    }

    output.line(&format!("Project: {}", project.root().display()));
    output.line("");
    output.line(&format!("{:<10} {:<24} {:>6} {:>6}", "LIST", "FILE", "OPEN", "DONE"));
    output.line(&"-".repeat(50));
    for (label, path, counts) in &rows {
        match counts {
            Some(c) => output.line(&format!("{:<10} {:<24} {:>6} {:>6}", label, path, c.open, c.done)),
            None => output.line(&format!("{:<10} {:<24} {:>6} {:>6}", label, path, "-", "-")),
        }
    }

    Ok(())
}
