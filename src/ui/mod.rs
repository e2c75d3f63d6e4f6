//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Diagnostic output gated by verbosity
//!
//! # Design
//!
//! All terminal diagnostics go through this module so that `--quiet` and
//! `--debug` behave the same in every command.

pub mod output;
