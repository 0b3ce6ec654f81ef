//! Todo editing commands: add, done, archive, wait, someday

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;
use thiserror::Error;

use super::output::Output;
use crate::domain::{
    apply_edits, ArchivePlan, Command, Document, Edit, LineSpan, Outcome, TextRange,
};
use crate::storage::{load_document, save_document, Project};

/// Arguments shared by the selection-based commands
#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Document to edit (defaults to the todo file)
    pub file: Option<PathBuf>,

    /// Line or inclusive range to act on, 1-based (repeatable)
    #[arg(long = "line", short = 'l', value_name = "N[-M]")]
    pub lines: Vec<LineSelection>,

    /// Show the planned edits without changing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("Invalid line selection '{0}': expected N or N-M")]
    Invalid(String),

    #[error("Line numbers start at 1, got '{0}'")]
    Zero(String),

    #[error("Line range {0}-{1} is reversed")]
    Reversed(usize, usize),

    #[error("Line {line} is out of range (document has {count} lines)")]
    OutOfRange { line: usize, count: usize },
}

/// A 1-based inclusive line range given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSelection {
    first: usize,
    last: usize,
}

impl LineSelection {
    pub fn line(line: usize) -> Self {
        Self {
            first: line,
            last: line,
        }
    }

    /// Converts the selection into a buffer region over `spans`
    pub fn to_region(&self, spans: &[LineSpan]) -> Result<TextRange, SelectionError> {
        let out_of_range = |line| SelectionError::OutOfRange {
            line,
            count: spans.len(),
        };
        let span_at = |line: usize| {
            line.checked_sub(1)
                .and_then(|index| spans.get(index))
                .ok_or_else(|| out_of_range(line))
        };
        let first = span_at(self.first)?;
        let last = span_at(self.last)?;

        Ok(TextRange::new(first.range.start, last.range.end))
    }
}

impl FromStr for LineSelection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |part: &str| -> Result<usize, SelectionError> {
            let n: usize = part
                .trim()
                .parse()
                .map_err(|_| SelectionError::Invalid(s.to_string()))?;
            if n == 0 {
                return Err(SelectionError::Zero(s.to_string()));
            }
            Ok(n)
        };

        let (first, last) = match s.split_once('-') {
            Some((first, last)) => (parse(first)?, parse(last)?),
            None => {
                let n = parse(s)?;
                (n, n)
            }
        };

        if first > last {
            return Err(SelectionError::Reversed(first, last));
        }

        Ok(Self { first, last })
    }
}

impl fmt::Display for LineSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

/// Runs one of the editing commands against a document
pub fn run(output: &Output, command: Command, args: &EditArgs) -> Result<()> {
    let ctx = command.as_str();
    let (project, path) = open_target(args.file.as_deref())?;
    output.verbose_ctx(ctx, &format!("Project root: {}", project.root().display()));
    output.verbose_ctx(ctx, &format!("Document: {}", path.display()));

    let mut document = load_document(&path)?;
    let regions = select_regions(&document, command, &args.lines)?;
    output.verbose_ctx(ctx, &format!("{} region(s) selected", regions.len()));

    let now = Local::now().naive_local();
    let display = project.display_path(&path);

    match project.processor().run(command, &document, &regions, now) {
        Outcome::NotApplicable => {
            output.skipped(
                "not_applicable",
                &format!("Skipped: {} is not a Markdown document", display),
            );
        }
        Outcome::Edits(edits) => {
            output.verbose_ctx(ctx, &format!("{} edit(s) planned", edits.len()));
            if args.dry_run {
                report_plan(output, command, &display, &edits, None);
            } else if matches!(command, Command::Wait | Command::Someday) {
                output.skipped(
                    "reserved",
                    &format!("'{}' is reserved and does not change anything yet", ctx),
                );
            } else if edits.is_empty() {
                output.skipped("no_items", &format!("No todo items selected in {}", display));
            } else {
                apply_edits(&mut document, &edits);
                save_document(&document)?;
                report_applied(output, command, &display, &edits);
            }
        }
        Outcome::Archive(plan) => {
            let archive = project.files().archive;
            if path == archive {
                anyhow::bail!("Refusing to archive {} into itself", display);
            }

            output.verbose_ctx(ctx, &format!("{} line(s) to archive", plan.append_lines.len()));
            if args.dry_run {
                report_plan(output, command, &display, &plan.edits, Some(&plan));
            } else if plan.is_empty() {
                output.skipped("no_items", &format!("Nothing to archive in {}", display));
            } else {
                // append first: a failed write must leave the document untouched
                let written = project.archive_store().append(&plan).with_context(|| {
                    format!("Failed to archive items from {}", display)
                })?;
                apply_edits(&mut document, &plan.edits);
                save_document(&document)?;
                report_archived(output, &display, &project.display_path(&archive), &plan, written);
            }
        }
    }

    Ok(())
}

/// Finds the project and the document a command operates on
fn open_target(file: Option<&Path>) -> Result<(Project, PathBuf)> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    match file {
        Some(file) => {
            let path = Project::resolve_path(file, &cwd);
            let dir = path.parent().unwrap_or(&cwd);
            let project = Project::discover(dir)?;
            Ok((project, path))
        }
        None => {
            let project = Project::discover(&cwd)?;
            let path = project.files().todo;
            Ok((project, path))
        }
    }
}

/// Turns the command-line selection into buffer regions
fn select_regions(
    document: &Document,
    command: Command,
    selections: &[LineSelection],
) -> Result<Vec<TextRange>> {
    let spans = document.line_spans();

    if selections.is_empty() {
        return match command {
            Command::Done => anyhow::bail!("No lines selected; pass --line N or --line N-M"),
            Command::Archive => Ok(Vec::new()),
            // default to the last line
            _ => Ok(spans
                .last()
                .map(|span| vec![TextRange::point(span.range.start)])
                .unwrap_or_default()),
        };
    }

    selections
        .iter()
        .map(|selection| selection.to_region(&spans).map_err(anyhow::Error::from))
        .collect()
}

fn touched_lines(edits: &[Edit]) -> BTreeSet<usize> {
    edits.iter().map(|edit| edit.line()).collect()
}

fn report_plan(
    output: &Output,
    command: Command,
    display: &str,
    edits: &[Edit],
    plan: Option<&ArchivePlan>,
) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "command": command,
            "file": display,
            "dry_run": true,
            "edits": edits,
            "append_lines": plan.map(|p| p.append_lines.clone()).unwrap_or_default(),
        }));
        return;
    }

    if edits.is_empty() {
        output.line(&format!("No changes planned for {}", display));
        return;
    }

    output.line(&format!("Planned edits for {}:", display));
    for edit in edits {
        output.line(&format!("  {}", edit));
    }

    if let Some(plan) = plan {
        output.line("Lines to archive:");
        for line in &plan.append_lines {
            output.line(&format!("  {}", line));
        }
    }
}

fn report_applied(output: &Output, command: Command, display: &str, edits: &[Edit]) {
    let lines = touched_lines(edits);

    if output.is_json() {
        output.data(&serde_json::json!({
            "command": command,
            "file": display,
            "lines": lines.iter().map(|l| l + 1).collect::<Vec<_>>(),
            "edits": edits,
        }));
        return;
    }

    let verb = match command {
        Command::Add => "Added",
        _ => "Toggled",
    };
    output.success(&format!("{} {} item(s) in {}", verb, lines.len(), display));
}

fn report_archived(output: &Output, display: &str, archive: &str, plan: &ArchivePlan, written: usize) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "command": Command::Archive,
            "file": display,
            "archive": archive,
            "archived": plan.append_lines,
        }));
        return;
    }

    output.success(&format!(
        "Archived {} item(s) from {} to {}",
        written, display, archive
    ));
}
