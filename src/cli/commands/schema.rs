//! schema command - Print the JSON schema of a node type

use anyhow::Result;

use super::print_json;
use crate::cli::Context;
use crate::core::registry::Registry;
use crate::core::schema;
use crate::core::types::{ModelKind, SchemaView};
use crate::ui::output;

/// Print the schema document of `model`.
pub fn schema(ctx: &Context, model: ModelKind, input: bool) -> Result<()> {
    let view = if input {
        SchemaView::Input
    } else {
        SchemaView::Output
    };
    output::debug(format!("generating {view} schema for {model}"), ctx.verbosity);
    let registry = Registry::standard();
    print_json(&schema::document(&registry, model, view))
}
