//! models::lesson
//!
//! Lessons of a course and their static files.

use crate::core::convert::Converter;
use crate::core::error::ModelError;
use crate::core::field::{empty_map, Field};
use crate::core::graph::Root;
use crate::core::node::{Attr, Node};
use crate::core::registry::{KeySource, ModelBuilder, ModelSpec};
use crate::core::types::{ModelKind, NodeId};
use crate::core::value::Value;

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::Lesson)
        .doc("A lesson: collection of pages on a single topic")
        .key("lesson_slug", KeySource::Construct)
        .inherits(&[Attr::Course])
        .field(Field::new("slug", Converter::Str).factory(construct_key))
        // Static files load first so page content can link to them.
        .field(
            Field::new("static_files", Converter::dict(Converter::Model(ModelKind::StaticFile)))
                .factory(empty_map)
                .doc("Static files the lesson's pages link to"),
        )
        .field(Field::new("pages", Converter::dict(Converter::Model(ModelKind::Page))))
        .build()
}

pub fn static_file_spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::StaticFile)
        .doc("Static file specific to a lesson")
        .key("filename", KeySource::Construct)
        .inherits(&[Attr::Course, Attr::Lesson])
        .field(Field::new("filename", Converter::Str).factory(construct_key))
        .field(
            Field::new("path", Converter::Str)
                .doc("Path of the file, relative to the content repository"),
        )
        .build()
}

/// Factory for identity fields that repeat the node's key.
pub(crate) fn construct_key(node: &Node) -> Value {
    Value::from(node.key().unwrap_or_default())
}

impl Root {
    /// Page of a loaded lesson by slug.
    pub fn page(&self, lesson: NodeId, slug: &str) -> Result<NodeId, ModelError> {
        self.node(lesson).child("pages", slug).ok_or_else(|| ModelError::NotFound {
            kind: ModelKind::Page,
            key: slug.to_string(),
        })
    }

    pub fn static_file(&self, lesson: NodeId, filename: &str) -> Option<NodeId> {
        self.node(lesson).child("static_files", filename)
    }
}
