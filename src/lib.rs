//! Syllabus - load, dump and schema engine for course content graphs
//!
//! Syllabus turns the raw output of a course content renderer into a typed,
//! validated object graph (courses, sessions, materials, lessons, pages)
//! and back into JSON that conforms to a generated JSON Schema.
//!
//! # Architecture
//!
//! - [`core`] - The generic engine: fields, converters, the node arena,
//!   schema generation, URL tables and lazy lesson caching
//! - [`models`] - Declarations of the concrete node types
//! - [`render`] - Seam to the external content renderer
//! - [`config`] - Configuration schema and loading
//! - [`cli`] - Command-line interface layer
//! - [`ui`] - Terminal diagnostics
//!
//! # Invariants
//!
//! 1. Every node has exactly one owner, fixed at construction
//! 2. Renderer output is validated against the input schema before loading
//! 3. Served data is validated against the output schema before it leaves
//! 4. Once a course is frozen its lessons never change

pub mod cli;
pub mod config;
pub mod core;
pub mod models;
pub mod render;
pub mod ui;
