//! # Storage Layer
//!
//! Everything that touches the filesystem.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Config | TOML | `mdtodo.toml` at the project root |
//! | Todo lists | Markdown, one item per line | `todo_file`, `waiting_file`, `someday_file` |
//! | Archive | Markdown, append-only | `archive_file` |
//!
//! ## Write Safety
//!
//! - Documents are saved atomically (temp file + rename)
//! - The archive is appended under an exclusive `fs2` lock
//! - `archive` appends first and only then saves the edited document, so a
//!   failed append never loses items
//!
//! ## Key Types
//!
//! - [`Project`] - Root discovery and resolved file set
//! - [`Config`] - Project and global configuration
//! - [`ArchiveStore`] - Append-only archive writer

mod archive;
mod config;
mod document;
mod project;

pub use archive::ArchiveStore;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, CONFIG_FILE};
pub use document::{load_document, save_document};
pub use project::{Project, ProjectError};
