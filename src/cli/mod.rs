//! cli
//!
//! Command-line interface layer for Syllabus.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a [`Context`]
//! and dispatches to the handlers in [`commands`], which drive the content
//! graph in [`crate::models`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;

use crate::config::Config;
use crate::ui::output::{self, Verbosity};

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    let loaded = Config::load(cli.config.as_deref())?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    if let Some(path) = loaded.config.loaded_from() {
        output::debug(format!("config loaded from {}", path.display()), verbosity);
    }

    let ctx = Context {
        config: loaded.config,
        verbosity,
    };
    commands::dispatch(cli.command, &ctx)
}
