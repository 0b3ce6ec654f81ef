//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::todo::{self, EditArgs};
use super::query;
use crate::domain::Command;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "mdtodo")]
#[command(author, version, about = "Plain-text todo lists in Markdown files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new mdtodo project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Start a new item on the selected lines
    ///
    /// Examples:
    ///   mdtodo add                  # new item after the last line of todo.md
    ///   mdtodo add notes.md -l 4    # new item below line 4
    Add(EditArgs),

    /// Toggle the selected items between open and done
    ///
    /// Examples:
    ///   mdtodo done -l 3
    ///   mdtodo done waiting.md -l 2-5 -l 9
    Done(EditArgs),

    /// Move done items into the archive file
    Archive {
        /// Document to archive from (defaults to the todo file)
        file: Option<std::path::PathBuf>,

        /// Show what would be archived without changing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Move the selected items to the waiting list (reserved)
    Wait(EditArgs),

    /// Move the selected items to the someday list (reserved)
    Someday(EditArgs),

    /// List the items of a document
    List {
        /// Document to list (defaults to the todo file)
        file: Option<std::path::PathBuf>,

        /// Only open items
        #[arg(long, conflicts_with = "done")]
        open: bool,

        /// Only done items
        #[arg(long)]
        done: bool,
    },

    /// Show item counts for every configured file
    Status,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("mdtodo starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Todo file: {}", project.files().todo.display()),
            );
            output.success(&format!(
                "Initialized mdtodo project at {}",
                project.root().display()
            ));
        }

        Commands::Add(args) => todo::run(&output, Command::Add, &args)?,
        Commands::Done(args) => todo::run(&output, Command::Done, &args)?,
        Commands::Archive { file, dry_run } => {
            let args = EditArgs {
                file,
                lines: Vec::new(),
                dry_run,
            };
            todo::run(&output, Command::Archive, &args)?
        }
        Commands::Wait(args) => todo::run(&output, Command::Wait, &args)?,
        Commands::Someday(args) => todo::run(&output, Command::Someday, &args)?,

        Commands::List { file, open, done } => {
            output.verbose_ctx("list", &format!("open={}, done={}", open, done));
            query::list(&output, file.as_deref(), query::ListFilter::from_flags(open, done))?
        }
        Commands::Status => {
            output.verbose("Gathering project status");
            query::status(&output)?
        }
    }

    output.verbose("Command completed successfully");
    Ok(())
}
