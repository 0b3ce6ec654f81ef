//! Configuration handling for mdtodo
//!
//! Project configuration is the `mdtodo.toml` marker file at the project
//! root. Global defaults live in `~/.config/mdtodo/config.toml` (or the
//! platform equivalent).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ProcessorSettings, TimestampFormat, TodoFileSet};

/// Name of the project marker / configuration file
pub const CONFIG_FILE: &str = "mdtodo.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No mdtodo.toml found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Main todo list, relative to the project root
    pub todo_file: String,

    /// Where archived items are appended
    pub archive_file: String,

    /// Items blocked on someone else
    pub waiting_file: String,

    /// Items deferred indefinitely
    pub someday_file: String,

    /// Overrides the global timestamp format when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<TimestampFormat>,

    /// Only archive from the todo, waiting and someday files
    pub restrict_archive: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            todo_file: "todo.md".to_string(),
            archive_file: "archive.md".to_string(),
            waiting_file: "waiting.md".to_string(),
            someday_file: "someday.md".to_string(),
            timestamp_format: None,
            restrict_archive: true,
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Timestamp format used when a project does not set one
    pub timestamp_format: TimestampFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: PathBuf,
}

impl Config {
    /// Loads configuration for a project root. The marker file must exist.
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: project_root.to_path_buf(),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "mdtodo", "mdtodo").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration, falling back to defaults when absent
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(CONFIG_FILE);

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")
    }

    /// Walks up from `start` looking for the marker file
    pub fn find_project_root(start: &Path) -> Result<PathBuf, ConfigError> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(CONFIG_FILE).is_file() {
                return Ok(current);
            }

            if !current.pop() {
                return Err(ConfigError::NotFound(start.to_path_buf()));
            }
        }
    }

    /// Effective timestamp format (project, then global)
    pub fn timestamp_format(&self) -> TimestampFormat {
        self.project
            .timestamp_format
            .unwrap_or(self.global.timestamp_format)
    }

    /// Resolves the configured file names against the project root
    pub fn file_set(&self) -> TodoFileSet {
        let root = &self.project_root;
        TodoFileSet {
            todo: root.join(&self.project.todo_file),
            archive: root.join(&self.project.archive_file),
            waiting: root.join(&self.project.waiting_file),
            someday: root.join(&self.project.someday_file),
        }
    }

    /// Settings handed to the todo processor
    pub fn processor_settings(&self) -> ProcessorSettings {
        ProcessorSettings {
            files: self.file_set(),
            timestamp_format: self.timestamp_format(),
            restrict_archive: self.project.restrict_archive,
        }
    }
}
