//! Domain models for mdtodo
//!
//! Line grammar, edit instructions and the todo processor. Nothing in here
//! touches the filesystem; buffers are reached through [`TextBuffer`].

mod buffer;
mod edit;
mod line;
mod processor;

pub use buffer::{apply_edits, Document, LineEnding, LineSnapshot, LineSpan, TextBuffer};
pub use edit::{Edit, TextRange};
pub use line::{is_archivable, parse_line, Marker, TodoLine};
pub use processor::{
    is_markdown_path, ArchivePlan, Command, Outcome, ProcessorSettings, TimestampFormat,
    TodoFileSet, TodoLineProcessor, MARKDOWN_EXTENSIONS,
};
