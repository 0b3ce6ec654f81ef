//! Todo line grammar
//!
//! ```text
//! - <body>                      open item
//! + @done (<timestamp>) <body>  done item
//! ```
//!
//! Items may be indented with spaces or tabs. Any other line is not a todo
//! item and is left alone by every operation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use super::edit::TextRange;

/// Matches a done annotation together with the whitespace in front of it.
/// Group 1 is the timestamp.
static DONE_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*@done\s*\(([^)]+)\)").expect("done annotation pattern"));

/// Matches a line that is a completed item and can be archived
static ARCHIVABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\+\s*@done.*$").expect("archivable line pattern"));

/// Leading marker of a todo item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Open,
    Done,
}

impl Marker {
    pub fn symbol(&self) -> char {
        match self {
            Marker::Open => '-',
            Marker::Done => '+',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::Open => "open",
            Marker::Done => "done",
        }
    }
}

/// A classified line of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoLine {
    /// Whitespace in front of the marker
    pub indent: String,

    /// `None` when the line is not a todo item
    pub marker: Option<Marker>,

    /// Text after the marker and its space. For done items this still
    /// contains the done annotation; for non-items it is the whole line.
    pub body: String,

    /// Timestamp of the done annotation, only ever set on done items
    pub done_at: Option<String>,
}

/// Classifies a raw line. Never fails: unrecognized lines are inert.
pub fn parse_line(raw: &str) -> TodoLine {
    let trimmed = raw.trim_start_matches([' ', '\t']);
    let indent = &raw[..raw.len() - trimmed.len()];

    if let Some(body) = trimmed.strip_prefix("- ") {
        return TodoLine {
            indent: indent.to_string(),
            marker: Some(Marker::Open),
            body: body.to_string(),
            done_at: None,
        };
    }

    if let Some(body) = trimmed.strip_prefix("+ ") {
        let done_at = DONE_ANNOTATION
            .captures(body)
            .map(|caps| caps[1].trim().to_string());
        return TodoLine {
            indent: indent.to_string(),
            marker: Some(Marker::Done),
            body: body.to_string(),
            done_at,
        };
    }

    TodoLine {
        indent: String::new(),
        marker: None,
        body: raw.to_string(),
        done_at: None,
    }
}

/// Returns true if the line is a completed item the archive picks up.
/// The line must parse as a done item, so `+@done` without the marker
/// space stays inert.
pub fn is_archivable(raw: &str) -> bool {
    parse_line(raw).is_done() && ARCHIVABLE.is_match(raw)
}

impl TodoLine {
    pub fn is_done(&self) -> bool {
        self.marker == Some(Marker::Done)
    }

    /// Byte offset of the marker character within the line
    pub fn marker_offset(&self) -> Option<usize> {
        self.marker.map(|_| self.indent.len())
    }

    /// Line-relative span of the done annotation, including the whitespace
    /// that separates it from the marker
    pub fn annotation_span(&self) -> Option<TextRange> {
        if !self.is_done() {
            return None;
        }
        // search from just past the marker so the separating space is included
        let after_marker = self.indent.len() + 1;
        let raw = self.render();
        DONE_ANNOTATION
            .find(&raw[after_marker..])
            .map(|m| TextRange::new(m.start(), m.end()).offset_by(after_marker))
    }

    /// Body text with the done annotation removed
    pub fn title(&self) -> String {
        if self.is_done() {
            DONE_ANNOTATION.replace(&self.body, "").trim().to_string()
        } else {
            self.body.trim().to_string()
        }
    }

    /// Renders the line back to text; `render(parse_line(s)) == s`
    pub fn render(&self) -> String {
        match self.marker {
            Some(marker) => format!("{}{} {}", self.indent, marker.symbol(), self.body),
            None => self.body.clone(),
        }
    }
}

impl fmt::Display for TodoLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
