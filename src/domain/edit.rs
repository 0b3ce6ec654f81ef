//! Edit instructions produced by the todo processor
//!
//! Every edit is expressed in byte offsets of the document snapshot it was
//! computed from. A batch is ordered bottom-to-top, so applying the edits
//! one after another never invalidates an offset that is still pending.

use serde::Serialize;
use std::fmt;

/// Half-open byte range `[start, end)` within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {} past end {}", start, end);
        Self { start, end }
    }

    /// An empty range at `offset` (a bare cursor)
    pub fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Shifts a line-relative range to absolute document offsets
    pub fn offset_by(&self, base: usize) -> Self {
        Self::new(self.start + base, self.end + base)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A single buffer mutation
///
/// `line` is the 0-based index of the line the edit belongs to; it is
/// informational and not used when applying the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edit {
    Insert {
        line: usize,
        offset: usize,
        text: String,
    },
    Replace {
        line: usize,
        range: TextRange,
        text: String,
    },
    Erase {
        line: usize,
        range: TextRange,
    },
}

impl Edit {
    /// Returns the line index this edit targets
    pub fn line(&self) -> usize {
        match self {
            Edit::Insert { line, .. } | Edit::Replace { line, .. } | Edit::Erase { line, .. } => {
                *line
            }
        }
    }

    /// Returns the lowest offset touched by this edit
    pub fn start(&self) -> usize {
        match self {
            Edit::Insert { offset, .. } => *offset,
            Edit::Replace { range, .. } | Edit::Erase { range, .. } => range.start,
        }
    }

    /// Short label used in text output
    pub fn label(&self) -> &'static str {
        match self {
            Edit::Insert { .. } => "insert",
            Edit::Replace { .. } => "replace",
            Edit::Erase { .. } => "erase",
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::Insert { line, offset, text } => {
                write!(f, "line {}: {} {:?} at {}", line + 1, self.label(), text, offset)
            }
            Edit::Replace { line, range, text } => {
                write!(f, "line {}: {} {} with {:?}", line + 1, self.label(), range, text)
            }
            Edit::Erase { line, range } => write!(f, "line {}: {} {}", line + 1, self.label(), range),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_basics() {
        let range = TextRange::new(3, 7);
        assert_eq!(TextRange::point(5), TextRange::new(5, 5));
        assert_eq!(range.offset_by(10), TextRange::new(13, 17));
    }

    #[test]
    fn edit_accessors() {
        let edit = Edit::Replace {
            line: 2,
            range: TextRange::new(10, 11),
            text: "-".to_string(),
        };
        assert_eq!(edit.line(), 2);
        assert_eq!(edit.start(), 10);
        assert_eq!(edit.label(), "replace");
        assert_eq!(edit.to_string(), "line 3: replace 10..11 with \"-\"");
    }

    #[test]
    fn edit_serializes_with_kind_tag() {
        let edit = Edit::Erase {
            line: 0,
            range: TextRange::new(0, 4),
        };
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json["kind"], "erase");
        assert_eq!(json["range"]["end"], 4);
    }
}
