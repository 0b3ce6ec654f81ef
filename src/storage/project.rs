//! Project management
//!
//! A project is a directory holding `mdtodo.toml`. The root is resolved once
//! per invocation and everything downstream receives resolved paths.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, CONFIG_FILE};
use super::ArchiveStore;
use crate::domain::{TodoFileSet, TodoLineProcessor};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in an mdtodo project (no mdtodo.toml at {}). Run 'mdtodo init' first.", .0.display())]
    NotInProject(PathBuf),
}

/// An mdtodo project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(CONFIG_FILE).is_file() {
            return Err(ProjectError::NotInProject(root).into());
        }

        // canonical root so resolved file paths compare equal to documents
        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve project root: {}", root.display()))?;
        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project containing `dir` (or one of its parents)
    pub fn discover(dir: &Path) -> Result<Self> {
        let root = Config::find_project_root(dir)?;
        Self::open(root)
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::discover(&cwd)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;

        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            let default_config = r#"# mdtodo configuration
# File paths are relative to this directory.

todo_file = "todo.md"
archive_file = "archive.md"
waiting_file = "waiting.md"
someday_file = "someday.md"

# Completion stamp: "date_time" (YYYY-MM-DD HH:MM) or "date" (YYYY-MM-DD)
# timestamp_format = "date_time"

# Only archive from the todo, waiting and someday files
restrict_archive = true
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let project = Self::open(root)?;

        let todo_path = project.files().todo;
        if !todo_path.exists() {
            if let Some(parent) = todo_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            fs::write(&todo_path, "# Todo\n\n")
                .with_context(|| format!("Failed to write todo file: {}", todo_path.display()))?;
        }

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the resolved todo / archive / waiting / someday paths
    pub fn files(&self) -> TodoFileSet {
        self.config.file_set()
    }

    /// Builds a processor bound to this project's settings
    pub fn processor(&self) -> TodoLineProcessor {
        TodoLineProcessor::new(self.config.processor_settings())
    }

    /// Returns the archive file writer
    pub fn archive_store(&self) -> ArchiveStore {
        ArchiveStore::new(self.files().archive)
    }

    /// Resolves a user-supplied path; relative paths are taken from `base`
    pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        };
        joined.canonicalize().unwrap_or(joined)
    }

    /// Returns a path relative to the project root, for display
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(|p| p.to_path_buf())
    }

    /// Display form of a path: relative when inside the project
    pub fn display_path(&self, path: &Path) -> String {
        self.relative_path(path)
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.root().join(CONFIG_FILE).is_file());
        assert!(project.files().todo.is_file());
        assert!(!project.files().archive.exists());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(dir.path().join("todo.md"), "- keep me\n").unwrap();
        Project::init(dir.path()).unwrap();

        let content = fs::read_to_string(dir.path().join("todo.md")).unwrap();
        assert_eq!(content, "- keep me\n");
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn discover_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();
        let sub = dir.path().join("notes").join("2024");
        fs::create_dir_all(&sub).unwrap();

        let project = Project::discover(&sub).unwrap();
        assert_eq!(project.root(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn files_follow_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "todo_file = \"lists/inbox.md\"\nrestrict_archive = false\n",
        )
        .unwrap();

        let project = Project::init(dir.path()).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(project.files().todo, root.join("lists/inbox.md"));
        assert!(project.files().todo.is_file());
        assert!(!project.processor().settings().restrict_archive);
    }

    #[test]
    fn resolve_and_display_paths() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        let root = project.root().to_path_buf();

        let resolved = Project::resolve_path(Path::new("todo.md"), &root);
        assert_eq!(resolved, root.join("todo.md"));
        assert!(project.files().is_primary(&resolved));
        assert_eq!(project.display_path(&resolved), "todo.md");
    }
}
