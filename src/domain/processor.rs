//! Todo line processor
//!
//! Turns a snapshot of selected lines into a batch of edits. Per-line state
//! machine:
//!
//! ```text
//! None --add--> Open --mark_done--> Done --archive--> removed
//!                 ^                   |
//!                 +----mark_done------+
//! ```
//!
//! Lines that are not todo items are never touched by `mark_done` or
//! `archive`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::buffer::{LineEnding, LineSnapshot, TextBuffer};
use super::edit::{Edit, TextRange};
use super::line::{is_archivable, parse_line, Marker};

/// File extensions a document must carry for any command to apply
pub const MARKDOWN_EXTENSIONS: [&str; 3] = ["md", "markdown", "mdown"];

/// Returns true if `path` names a Markdown file
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(&ext))
}

/// How the completion time is written into a done annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `YYYY-MM-DD HH:MM`
    #[default]
    DateTime,
    /// `YYYY-MM-DD`
    Date,
}

impl TimestampFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            TimestampFormat::DateTime => "%Y-%m-%d %H:%M",
            TimestampFormat::Date => "%Y-%m-%d",
        }
    }

    pub fn format(&self, now: NaiveDateTime) -> String {
        now.format(self.pattern()).to_string()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampFormat::DateTime => "date_time",
            TimestampFormat::Date => "date",
        }
    }
}

/// The set of files a project works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoFileSet {
    pub todo: PathBuf,
    pub archive: PathBuf,
    pub waiting: PathBuf,
    pub someday: PathBuf,
}

impl TodoFileSet {
    /// The files eligible for archiving
    pub fn primary(&self) -> [&Path; 3] {
        [self.todo.as_path(), self.waiting.as_path(), self.someday.as_path()]
    }

    pub fn is_primary(&self, path: &Path) -> bool {
        self.primary().iter().any(|p| *p == path)
    }
}

/// Everything the processor needs, resolved once per invocation
#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    pub files: TodoFileSet,
    pub timestamp_format: TimestampFormat,

    /// When set, archive only runs on the primary files
    pub restrict_archive: bool,
}

/// A command the processor can run against a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Add,
    Done,
    Archive,
    Wait,
    Someday,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Add => "add",
            Command::Done => "done",
            Command::Archive => "archive",
            Command::Wait => "wait",
            Command::Someday => "someday",
        }
    }
}

/// Result of `archive`: lines to move and the edits that remove them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ArchivePlan {
    /// Erase edits, bottom-to-top
    pub edits: Vec<Edit>,

    /// Trimmed lines to append, top-to-bottom
    pub append_lines: Vec<String>,

    /// Terminator written after every appended line
    pub line_ending: LineEnding,
}

impl ArchivePlan {
    pub fn is_empty(&self) -> bool {
        self.append_lines.is_empty()
    }

    /// Text to append to the archive file, every line terminated
    pub fn append_text(&self) -> String {
        let ending = self.line_ending.as_str();
        self.append_lines
            .iter()
            .map(|line| format!("{}{}", line, ending))
            .collect()
    }
}

/// What running a command against a buffer produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The buffer is not a Markdown document; nothing to do
    NotApplicable,
    Edits(Vec<Edit>),
    Archive(ArchivePlan),
}

impl Outcome {
    /// Edits to apply to the buffer, whatever the command
    pub fn edits(&self) -> &[Edit] {
        match self {
            Outcome::NotApplicable => &[],
            Outcome::Edits(edits) => edits,
            Outcome::Archive(plan) => &plan.edits,
        }
    }
}

/// Pure text transforms over todo lines
pub struct TodoLineProcessor {
    settings: ProcessorSettings,
}

impl TodoLineProcessor {
    pub fn new(settings: ProcessorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    /// A document qualifies when it has a path with a Markdown extension
    pub fn is_applicable(path: Option<&Path>) -> bool {
        path.is_some_and(is_markdown_path)
    }

    /// Runs `command` against `buffer`.
    ///
    /// `regions` is the selection; `archive` ignores it and scans the whole
    /// buffer. `now` stamps items marked done.
    pub fn run<B: TextBuffer + ?Sized>(
        &self,
        command: Command,
        buffer: &B,
        regions: &[TextRange],
        now: NaiveDateTime,
    ) -> Outcome {
        if !Self::is_applicable(buffer.file_path()) {
            return Outcome::NotApplicable;
        }

        match command {
            Command::Add => Outcome::Edits(self.add(&buffer.snapshot(regions), buffer.line_ending())),
            Command::Done => Outcome::Edits(self.mark_done(&buffer.snapshot(regions), now)),
            Command::Archive => {
                let lines = buffer.snapshot(&[buffer.full_region()]);
                Outcome::Archive(self.archive(&lines, buffer.file_path(), buffer.line_ending()))
            }
            Command::Wait => Outcome::Edits(self.wait(&buffer.snapshot(regions))),
            Command::Someday => Outcome::Edits(self.someday(&buffer.snapshot(regions))),
        }
    }

    /// Starts a new open item on every selected line.
    ///
    /// An empty line gets the marker inserted in place; any other line is
    /// followed by a new line holding the marker.
    pub fn add(&self, lines: &[LineSnapshot], line_ending: LineEnding) -> Vec<Edit> {
        bottom_up(lines)
            .map(|line| {
                if line.text.is_empty() {
                    Edit::Insert {
                        line: line.index(),
                        offset: line.span.range.start,
                        text: "- ".to_string(),
                    }
                } else {
                    Edit::Replace {
                        line: line.index(),
                        range: line.span.range,
                        text: format!("{}{}- ", line.text, line_ending.as_str()),
                    }
                }
            })
            .collect()
    }

    /// Toggles every selected item between open and done
    pub fn mark_done(&self, lines: &[LineSnapshot], now: NaiveDateTime) -> Vec<Edit> {
        let stamp = self.settings.timestamp_format.format(now);
        let mut edits = Vec::new();

        for line in bottom_up(lines) {
            let parsed = parse_line(&line.text);
            let (Some(marker), Some(marker_offset)) = (parsed.marker, parsed.marker_offset()) else {
                continue;
            };
            let base = line.span.range.start;
            let marker_range = TextRange::new(marker_offset, marker_offset + 1).offset_by(base);

            match marker {
                Marker::Open => edits.push(Edit::Replace {
                    line: line.index(),
                    range: marker_range,
                    text: format!("+ @done ({})", stamp),
                }),
                Marker::Done => {
                    // erase sits right of the marker, so it goes first
                    if let Some(span) = parsed.annotation_span() {
                        edits.push(Edit::Erase {
                            line: line.index(),
                            range: span.offset_by(base),
                        });
                    }
                    edits.push(Edit::Replace {
                        line: line.index(),
                        range: marker_range,
                        text: "-".to_string(),
                    });
                }
            }
        }

        edits
    }

    /// Collects the completed items of a whole document for the archive.
    ///
    /// With `restrict_archive` set, documents outside the primary file set
    /// yield an empty plan.
    pub fn archive(
        &self,
        document: &[LineSnapshot],
        document_path: Option<&Path>,
        line_ending: LineEnding,
    ) -> ArchivePlan {
        let mut plan = ArchivePlan {
            line_ending,
            ..ArchivePlan::default()
        };

        if self.settings.restrict_archive
            && !document_path.is_some_and(|path| self.settings.files.is_primary(path))
        {
            return plan;
        }

        let done: Vec<&LineSnapshot> = document.iter().filter(|l| is_archivable(&l.text)).collect();

        plan.append_lines = done.iter().map(|l| l.text.trim().to_string()).collect();
        plan.edits = done
            .iter()
            .rev()
            .map(|l| Edit::Erase {
                line: l.index(),
                range: l.span.full,
            })
            .collect();

        plan
    }

    /// Reserved command: accepted, produces no edits
    pub fn wait(&self, _lines: &[LineSnapshot]) -> Vec<Edit> {
        Vec::new()
    }

    /// Reserved command: accepted, produces no edits
    pub fn someday(&self, _lines: &[LineSnapshot]) -> Vec<Edit> {
        Vec::new()
    }
}

/// Lines ordered bottom-to-top
fn bottom_up(lines: &[LineSnapshot]) -> impl Iterator<Item = &LineSnapshot> {
    let mut ordered: Vec<&LineSnapshot> = lines.iter().collect();
    ordered.sort_by(|a, b| b.index().cmp(&a.index()));
    ordered.into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::buffer::{apply_edits, Document};
    use chrono::NaiveDate;

    fn files() -> TodoFileSet {
        TodoFileSet {
            todo: PathBuf::from("/p/todo.md"),
            archive: PathBuf::from("/p/archive.md"),
            waiting: PathBuf::from("/p/waiting.md"),
            someday: PathBuf::from("/p/someday.md"),
        }
    }

    fn processor(restrict_archive: bool) -> TodoLineProcessor {
        TodoLineProcessor::new(ProcessorSettings {
            files: files(),
            timestamp_format: TimestampFormat::DateTime,
            restrict_archive,
        })
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 0)
            .unwrap()
    }

    fn todo_doc(text: &str) -> Document {
        Document::new(text).with_path("/p/todo.md")
    }

    /// Runs a command over the given 0-based lines and applies the edits
    fn run_on_lines(p: &TodoLineProcessor, command: Command, doc: &mut Document, lines: &[usize]) {
        let spans = doc.line_spans();
        let regions: Vec<_> = lines.iter().map(|i| TextRange::point(spans[*i].range.start)).collect();
        let outcome = p.run(command, &*doc, &regions, now());
        let edits = outcome.edits().to_vec();
        apply_edits(doc, &edits);
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(TimestampFormat::DateTime.format(now()), "2024-03-05 14:07");
        assert_eq!(TimestampFormat::Date.format(now()), "2024-03-05");
    }

    #[test]
    fn markdown_extensions() {
        assert!(is_markdown_path(Path::new("todo.md")));
        assert!(is_markdown_path(Path::new("a/b/notes.markdown")));
        assert!(is_markdown_path(Path::new("x.mdown")));
        assert!(!is_markdown_path(Path::new("todo.txt")));
        assert!(!is_markdown_path(Path::new("md")));
        assert!(!TodoLineProcessor::is_applicable(None));
    }

    #[test]
    fn add_on_empty_and_non_empty_lines() {
        let doc = todo_doc("\nbuy milk");
        let edits = processor(true).add(&doc.all_lines(), LineEnding::Unix);

        assert_eq!(
            edits,
            vec![
                Edit::Replace {
                    line: 1,
                    range: TextRange::new(1, 9),
                    text: "buy milk\n- ".to_string(),
                },
                Edit::Insert {
                    line: 0,
                    offset: 0,
                    text: "- ".to_string(),
                },
            ]
        );

        let mut doc = doc;
        apply_edits(&mut doc, &edits);
        assert_eq!(doc.text(), "- \nbuy milk\n- ");
    }

    #[test]
    fn add_uses_document_line_ending() {
        let mut doc = todo_doc("- first\r\n");
        run_on_lines(&processor(true), Command::Add, &mut doc, &[0]);
        assert_eq!(doc.text(), "- first\r\n- \r\n");
    }

    #[test]
    fn mark_done_stamps_open_item() {
        let mut doc = todo_doc("- task");
        run_on_lines(&processor(true), Command::Done, &mut doc, &[0]);

        assert_eq!(doc.text(), "+ @done (2024-03-05 14:07) task");
        assert!(doc.text().starts_with("+ @done ("));
        assert!(doc.text().ends_with(") task"));
    }

    #[test]
    fn mark_done_twice_restores_open_item() {
        let p = processor(true);
        let mut doc = todo_doc("- write spec");
        run_on_lines(&p, Command::Done, &mut doc, &[0]);
        run_on_lines(&p, Command::Done, &mut doc, &[0]);

        assert_eq!(doc.text(), "- write spec");
    }

    #[test]
    fn mark_done_reopens_done_item() {
        let mut doc = todo_doc("  + @done (2023-12-31 23:59) indented");
        run_on_lines(&processor(true), Command::Done, &mut doc, &[0]);
        assert_eq!(doc.text(), "  - indented");
    }

    #[test]
    fn mark_done_reopens_item_without_annotation() {
        let mut doc = todo_doc("+ finished");
        run_on_lines(&processor(true), Command::Done, &mut doc, &[0]);
        assert_eq!(doc.text(), "- finished");
    }

    #[test]
    fn mark_done_skips_non_items() {
        let doc = todo_doc("# Today\nsome notes\n");
        let edits = processor(true).mark_done(&doc.all_lines(), now());
        assert!(edits.is_empty());
    }

    #[test]
    fn mark_done_uses_configured_format() {
        let p = TodoLineProcessor::new(ProcessorSettings {
            files: files(),
            timestamp_format: TimestampFormat::Date,
            restrict_archive: true,
        });
        let mut doc = todo_doc("- task");
        run_on_lines(&p, Command::Done, &mut doc, &[0]);
        assert_eq!(doc.text(), "+ @done (2024-03-05) task");
    }

    #[test]
    fn mark_done_over_multiple_lines() {
        let mut doc = todo_doc("- one\nnote\n+ @done (2024-01-01) two\n- three");
        run_on_lines(&processor(true), Command::Done, &mut doc, &[0, 1, 2, 3]);
        assert_eq!(
            doc.text(),
            "+ @done (2024-03-05 14:07) one\nnote\n- two\n+ @done (2024-03-05 14:07) three"
        );
    }

    #[test]
    fn edits_are_bottom_to_top() {
        let doc = todo_doc("- a\n- b\n- c");
        let edits = processor(true).mark_done(&doc.all_lines(), now());
        let starts: Vec<_> = edits.iter().map(|e| e.start()).collect();
        let mut sorted = starts.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(starts, sorted);
    }

    #[test]
    fn archive_moves_only_done_lines() {
        let doc = todo_doc("- open item\n+ @done (2024-01-01) closed item\n");
        let plan = processor(true).archive(&doc.all_lines(), doc.file_path(), doc.line_ending());

        assert_eq!(plan.append_lines, vec!["+ @done (2024-01-01) closed item"]);
        assert_eq!(plan.edits.len(), 1);
        assert_eq!(plan.append_text(), "+ @done (2024-01-01) closed item\n");

        let mut doc = doc;
        apply_edits(&mut doc, &plan.edits);
        assert_eq!(doc.text(), "- open item\n");
    }

    #[test]
    fn archive_skips_lines_that_are_not_items() {
        let mut doc = todo_doc("+@done (2024-01-01) x\n+\t@done (2024-01-01) y\n+ @done (2024-01-01) z\n");
        let plan = processor(true).archive(&doc.all_lines(), doc.file_path(), doc.line_ending());

        assert_eq!(plan.append_lines, vec!["+ @done (2024-01-01) z"]);
        apply_edits(&mut doc, &plan.edits);
        assert_eq!(doc.text(), "+@done (2024-01-01) x\n+\t@done (2024-01-01) y\n");
    }

    #[test]
    fn archive_keeps_document_order_and_line_ending() {
        let doc = todo_doc("+ @done (2024-01-01) a\r\n- keep\r\n  + @done (2024-01-02) b  \r\n");
        let plan = processor(true).archive(&doc.all_lines(), doc.file_path(), doc.line_ending());

        assert_eq!(
            plan.append_lines,
            vec!["+ @done (2024-01-01) a", "+ @done (2024-01-02) b"]
        );
        assert_eq!(plan.line_ending, LineEnding::Windows);
        assert_eq!(plan.edits.iter().map(|e| e.line()).collect::<Vec<_>>(), vec![2, 0]);

        let mut doc = doc;
        apply_edits(&mut doc, &plan.edits);
        assert_eq!(doc.text(), "- keep\r\n");
    }

    #[test]
    fn archive_last_line_without_terminator() {
        let mut doc = todo_doc("- keep\n+ @done (2024-01-01) last");
        let plan = processor(true).archive(&doc.all_lines(), doc.file_path(), doc.line_ending());
        apply_edits(&mut doc, &plan.edits);
        assert_eq!(doc.text(), "- keep\n");
    }

    #[test]
    fn archive_is_idempotent() {
        let p = processor(true);
        let mut doc = todo_doc("- a\n+ @done (2024-01-01) b\n");

        let first = p.run(Command::Archive, &doc, &[], now());
        apply_edits(&mut doc, first.edits());
        assert!(!first.edits().is_empty());

        match p.run(Command::Archive, &doc, &[], now()) {
            Outcome::Archive(plan) => {
                assert!(plan.is_empty());
                assert!(plan.edits.is_empty());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn restricted_archive_ignores_other_documents() {
        let doc = Document::new("+ @done (2024-01-01) x\n").with_path("/p/notes.md");
        let plan = processor(true).archive(&doc.all_lines(), doc.file_path(), doc.line_ending());
        assert!(plan.is_empty());
        assert!(plan.edits.is_empty());

        let plan = processor(false).archive(&doc.all_lines(), doc.file_path(), doc.line_ending());
        assert_eq!(plan.append_lines.len(), 1);
    }

    #[test]
    fn restricted_archive_accepts_waiting_and_someday() {
        let p = processor(true);
        for path in ["/p/waiting.md", "/p/someday.md"] {
            let doc = Document::new("+ @done (2024-01-01) x").with_path(path);
            let plan = p.archive(&doc.all_lines(), doc.file_path(), doc.line_ending());
            assert_eq!(plan.append_lines.len(), 1, "{} should be archivable", path);
        }
    }

    #[test]
    fn non_markdown_documents_are_not_applicable() {
        let p = processor(false);
        let doc = Document::new("- task").with_path("/p/todo.txt");
        assert_eq!(p.run(Command::Done, &doc, &[TextRange::point(0)], now()), Outcome::NotApplicable);

        let doc = Document::new("- task");
        assert_eq!(p.run(Command::Add, &doc, &[TextRange::point(0)], now()), Outcome::NotApplicable);
    }

    #[test]
    fn wait_and_someday_are_no_ops() {
        let p = processor(true);
        let doc = todo_doc("- task");
        assert_eq!(p.run(Command::Wait, &doc, &[TextRange::point(0)], now()), Outcome::Edits(vec![]));
        assert_eq!(p.run(Command::Someday, &doc, &[TextRange::point(0)], now()), Outcome::Edits(vec![]));
    }
}
