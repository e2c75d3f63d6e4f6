//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Builds the content graph from configuration
//! 2. Calls into the graph to load, dump or describe content
//! 3. Prints the resulting JSON document to stdout
//!
//! Diagnostics go to stderr through [`crate::ui::output`], so stdout always
//! holds exactly one JSON document.

mod completion;
mod dump;
mod schema;

pub use completion::completion;
pub use dump::{dump, DumpArgs};
pub use schema::schema;

use anyhow::Result;
use serde_json::Value as Json;

use super::args::Command;
use super::Context;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Schema { model, input } => schema(ctx, model, input),
        Command::Dump {
            slug,
            content,
            abbreviate,
            input,
            no_freeze,
        } => dump(
            ctx,
            DumpArgs {
                slug,
                content,
                abbreviate,
                input,
                freeze: !no_freeze,
            },
        ),
        Command::Completion { shell } => completion(shell),
    }
}

/// Print a JSON document to stdout.
fn print_json(data: &Json) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}
