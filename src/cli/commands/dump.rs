//! dump command - Load a course and print its data

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::print_json;
use crate::cli::Context;
use crate::core::graph::{DumpOptions, Root};
use crate::render::JsonDirRenderer;
use crate::ui::output;

/// Arguments of the dump command.
#[derive(Debug, Clone)]
pub struct DumpArgs {
    pub slug: String,
    pub content: Option<PathBuf>,
    pub abbreviate: bool,
    pub input: bool,
    /// Load every referenced lesson before dumping
    pub freeze: bool,
}

/// Load a course from rendered content and print it.
pub fn dump(ctx: &Context, args: DumpArgs) -> Result<()> {
    let content = args.content.unwrap_or_else(|| ctx.config.content_dir());
    output::debug(format!("reading content from {}", content.display()), ctx.verbosity);

    let renderer = JsonDirRenderer::new(&content);
    let mut root = Root::standard(ctx.config.url_table(), Box::new(renderer))
        .with_api_version(ctx.config.api_version());
    match ctx.config.repo_info() {
        Some(repo) => root = root.with_repo_info(repo),
        None => output::debug("no repository configured, edit links are omitted", ctx.verbosity),
    }

    root.load_licenses().context("failed to load licenses")?;
    let canonical = args.slug.starts_with("courses/");
    let course = root
        .load_course(&args.slug, canonical)
        .with_context(|| format!("failed to load course '{}'", args.slug))?;
    if args.freeze {
        root.freeze_course(course)
            .with_context(|| format!("failed to load lessons of '{}'", args.slug))?;
        output::debug(
            format!("loaded {} lessons", root.lessons(course).len()),
            ctx.verbosity,
        );
    }

    let options = if args.input {
        DumpOptions::input()
    } else if args.abbreviate {
        DumpOptions::abbreviated()
    } else {
        DumpOptions::output()
    };
    let data = root
        .dump(course, options)
        .with_context(|| format!("failed to dump course '{}'", args.slug))?;
    print_json(&data)
}
