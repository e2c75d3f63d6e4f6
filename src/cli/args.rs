//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::types::ModelKind;

/// Syllabus - load, validate and serve course content graphs
#[derive(Parser, Debug)]
#[command(name = "syllabus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the standard locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the JSON schema of a node type
    #[command(
        name = "schema",
        after_help = "\
EXAMPLES:
    # Schema of served course data
    syllabus schema Course

    # Schema of course data as authored
    syllabus schema Course --input"
    )]
    Schema {
        /// Node type (Root, License, Course, RunYear, Session, SessionPage,
        /// Material, Lesson, Page, Solution, StaticFile)
        model: ModelKind,

        /// Print the input schema instead of the output schema
        #[arg(long)]
        input: bool,
    },

    /// Load a course from rendered content and print its data
    #[command(
        name = "dump",
        long_about = "Load a course from rendered content and print its data.\n\n\
            Content is read from a directory of pre-rendered JSON documents: \
            courses/<slug>.json, lessons/<slug>.json, extras/<slug>.json and \
            licenses/<slug>.json. The course is loaded, every lesson it \
            references is loaded, and the result is validated against the \
            output schema before it is printed."
    )]
    Dump {
        /// Course slug, e.g. `2024/pyladies`
        slug: String,

        /// Directory with rendered content (default: from config)
        #[arg(long)]
        content: Option<PathBuf>,

        /// Replace nested documents that have their own API URL with references
        #[arg(long)]
        abbreviate: bool,

        /// Print data in the input format instead
        #[arg(long, conflicts_with = "abbreviate")]
        input: bool,

        /// Do not load the course's lessons
        #[arg(long)]
        no_freeze: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
