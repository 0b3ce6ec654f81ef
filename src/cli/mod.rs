//! # Command-Line Interface
//!
//! Drives the todo processor over Markdown files on disk.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create `mdtodo.toml` and the todo file |
//! | `add`, `done` | Edit the selected lines (`-l N` or `-l N-M`, repeatable) |
//! | `archive` | Move done items to the archive file |
//! | `wait`, `someday` | Reserved, accepted but no-ops |
//! | `list`, `status` | Read-only views |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output on stderr:
//! ```bash
//! mdtodo --verbose archive
//! ```

mod app;
mod output;
mod query;
mod todo;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use todo::{EditArgs, LineSelection, SelectionError};
