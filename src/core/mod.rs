//! core
//!
//! The generic load/dump/schema engine.
//!
//! # Modules
//!
//! - [`types`] - Strong types: NodeId, ModelKind, UrlKind, SchemaView, etc.
//! - [`value`] - Loaded field values
//! - [`node`] - Node storage and parent-derived attributes
//! - [`field`] - Declarative field descriptors
//! - [`convert`] - Converters behind every field
//! - [`registry`] - Per-type field registries
//! - [`graph`] - The node arena, loading and dumping
//! - [`schema`] - JSON Schema generation and validation
//! - [`urls`] - Injected URL builders
//! - [`lazy`] - Per-course lesson cache
//! - [`content`] - Content pseudo-links in HTML
//! - [`error`] - Error taxonomy
//!
//! # Design Principles
//!
//! - Node types are data, not code: one spec drives load, dump and schema
//! - Schemas are strict and self-describing
//! - Nothing here knows about concrete node types beyond their kind

pub mod content;
pub mod convert;
pub mod error;
pub mod field;
pub mod graph;
pub mod lazy;
pub mod node;
pub mod registry;
pub mod schema;
pub mod types;
pub mod urls;
pub mod value;
