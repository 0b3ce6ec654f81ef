//! Text buffer capability
//!
//! The processor never mutates text itself. It reads line snapshots from a
//! [`TextBuffer`] and hands back [`Edit`]s that the buffer owner applies with
//! [`apply_edits`]. [`Document`] is the in-memory implementation used by the
//! CLI and by tests; an editor integration would implement the trait over its
//! own buffer type.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::edit::{Edit, TextRange};

/// Line terminator convention of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    #[default]
    Unix,
    Windows,
    ClassicMac,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Unix => "\n",
            LineEnding::Windows => "\r\n",
            LineEnding::ClassicMac => "\r",
        }
    }

    /// Detects the convention from the first terminator in `text`.
    /// Text without any terminator is treated as Unix.
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            match b {
                b'\n' => return LineEnding::Unix,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => return LineEnding::Windows,
                b'\r' => return LineEnding::ClassicMac,
                _ => {}
            }
        }
        LineEnding::Unix
    }
}

/// Position of one line inside a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineSpan {
    /// 0-based line number
    pub index: usize,

    /// Line content without its terminator
    pub range: TextRange,

    /// Line content plus its terminator (equal to `range` on the last line
    /// when the document does not end with a newline)
    pub full: TextRange,
}

/// A line's position together with its text at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    pub span: LineSpan,
    pub text: String,
}

impl LineSnapshot {
    pub fn new(span: LineSpan, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.span.index
    }
}

/// Host buffer operations the processor depends on
pub trait TextBuffer {
    /// Full text of the buffer
    fn text(&self) -> &str;

    /// Line terminator convention used when writing new lines
    fn line_ending(&self) -> LineEnding;

    /// File the buffer is associated with, if any
    fn file_path(&self) -> Option<&Path>;

    /// Every line touched by `region`, in document order. An empty region
    /// selects the line the cursor sits on.
    fn lines_of(&self, region: TextRange) -> Vec<LineSpan>;

    fn insert(&mut self, offset: usize, text: &str);

    fn replace(&mut self, range: TextRange, text: &str);

    fn erase(&mut self, range: TextRange);

    fn substr(&self, range: TextRange) -> &str {
        &self.text()[range.start..range.end]
    }

    /// Region spanning the whole buffer
    fn full_region(&self) -> TextRange {
        TextRange::new(0, self.text().len())
    }

    /// Snapshots the lines of several regions.
    ///
    /// Lines shared by overlapping regions appear once; the result is in
    /// document order.
    fn snapshot(&self, regions: &[TextRange]) -> Vec<LineSnapshot> {
        let mut spans: Vec<LineSpan> = regions
            .iter()
            .flat_map(|region| self.lines_of(*region))
            .collect();
        spans.sort_by_key(|span| span.index);
        spans.dedup_by_key(|span| span.index);

        spans
            .into_iter()
            .map(|span| LineSnapshot::new(span, self.substr(span.range)))
            .collect()
    }
}

/// Applies a batch of edits in the order given
pub fn apply_edits<B: TextBuffer + ?Sized>(buffer: &mut B, edits: &[Edit]) {
    for edit in edits {
        match edit {
            Edit::Insert { offset, text, .. } => buffer.insert(*offset, text),
            Edit::Replace { range, text, .. } => buffer.replace(*range, text),
            Edit::Erase { range, .. } => buffer.erase(*range),
        }
    }
}

/// In-memory text buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    line_ending: LineEnding,
    path: Option<PathBuf>,
}

impl Document {
    /// Creates a document, detecting its line ending from the text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_ending = LineEnding::detect(&text);
        Self {
            text,
            line_ending,
            path: None,
        }
    }

    /// Associates the document with a file path
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns every line of the document.
    ///
    /// Like an editor, a document ending in a terminator has a final empty
    /// line after it.
    pub fn line_spans(&self) -> Vec<LineSpan> {
        let bytes = self.text.as_bytes();
        let mut spans = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let terminator = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
                b'\r' | b'\n' => 1,
                _ => 0,
            };

            if terminator > 0 {
                spans.push(LineSpan {
                    index: spans.len(),
                    range: TextRange::new(start, i),
                    full: TextRange::new(start, i + terminator),
                });
                i += terminator;
                start = i;
            } else {
                i += 1;
            }
        }

        spans.push(LineSpan {
            index: spans.len(),
            range: TextRange::new(start, bytes.len()),
            full: TextRange::new(start, bytes.len()),
        });

        spans
    }

    /// Snapshot of every line in the document
    pub fn all_lines(&self) -> Vec<LineSnapshot> {
        self.snapshot(&[self.full_region()])
    }
}

impl TextBuffer for Document {
    fn text(&self) -> &str {
        &self.text
    }

    fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lines_of(&self, region: TextRange) -> Vec<LineSpan> {
        self.line_spans()
            .into_iter()
            .filter(|span| span.range.start <= region.end && span.range.end >= region.start)
            .collect()
    }

    fn insert(&mut self, offset: usize, text: &str) {
        self.text.insert_str(offset, text);
    }

    fn replace(&mut self, range: TextRange, text: &str) {
        self.text.replace_range(range.start..range.end, text);
    }

    fn erase(&mut self, range: TextRange) {
        self.text.replace_range(range.start..range.end, "");
    }
}
