//! mdtodo - plain-text todo lists embedded in Markdown files
//!
//! Items are single lines: `- task` is open, `+ @done (2024-01-01 09:30) task`
//! is done. The [`domain`] layer turns selected lines into edit batches
//! (add, toggle done, archive) without touching any file; [`storage`] and
//! [`cli`] apply them to documents on disk.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Command, Document, Edit, Marker, TodoLine, TodoLineProcessor};
