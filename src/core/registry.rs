//! core::registry
//!
//! Per-type field registries.
//!
//! # Design
//!
//! Each node type is described once by a [`ModelSpec`]: its ordered fields,
//! where its primary key comes from, which parent-derived attributes it
//! inherits and how its URL is resolved. Specs are assembled by one builder
//! function per type at startup and collected into a [`Registry`], which is
//! immutable afterwards and shared by `Arc`.
//!
//! Field sets of a base type are concatenated base-first with
//! [`ModelBuilder::extends`]. A derived field with the same name replaces the
//! base field in place.
//!
//! # Example
//!
//! ```
//! use syllabus::core::convert::Converter;
//! use syllabus::core::field::Field;
//! use syllabus::core::registry::{KeySource, ModelBuilder};
//! use syllabus::core::types::ModelKind;
//!
//! let base = vec![Field::new("source_file", Converter::Str).optional()];
//! let spec = ModelBuilder::new(ModelKind::License)
//!     .field(Field::new("title", Converter::Str))
//!     .extends(base)
//!     .key("license_slug", KeySource::Construct)
//!     .build();
//!
//! let names: Vec<_> = spec.fields().iter().map(|f| f.name()).collect();
//! assert_eq!(names, ["source_file", "title"]);
//! assert_eq!(spec.key_name(), Some("license_slug"));
//! ```

use std::collections::HashMap;
use std::fmt;

use super::error::ModelError;
use super::field::Field;
use super::graph::Root;
use super::node::{Attr, Node};
use super::types::{ModelKind, NodeId, UrlKind};

/// Where a node's primary key value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// The key given by the owner at construction
    Construct,
    /// The value of a field of the node
    Field(&'static str),
}

impl KeySource {
    /// Rendered key of `node`, if available.
    pub fn value_of(self, node: &Node) -> Option<String> {
        match self {
            KeySource::Construct => node.key().map(str::to_string),
            KeySource::Field(name) => node.field(name).and_then(|v| v.key_string()),
        }
    }
}

/// Resolves the URL of one node of a type with non-standard routing.
pub type CustomUrl = fn(&Root, NodeId, UrlKind, bool) -> Result<String, ModelError>;

/// How a node's URL is resolved.
#[derive(Clone, Copy, Default)]
pub enum UrlStrategy {
    /// Look up the URL table with the node's primary-key chain
    #[default]
    Keyed,
    /// Delegate to a custom function
    Custom(CustomUrl),
}

impl fmt::Debug for UrlStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlStrategy::Keyed => f.write_str("Keyed"),
            UrlStrategy::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Static description of one node type.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    kind: ModelKind,
    doc: Option<&'static str>,
    fields: Vec<Field>,
    base_len: usize,
    key: Option<(&'static str, KeySource)>,
    inherits: Vec<Attr>,
    url: UrlStrategy,
}

impl ModelSpec {
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }

    /// Fields in load order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Name of the primary key in URL key chains.
    pub fn key_name(&self) -> Option<&'static str> {
        self.key.map(|(name, _)| name)
    }

    pub fn key_source(&self) -> Option<KeySource> {
        self.key.map(|(_, source)| source)
    }

    /// Attributes copied from the parent at construction.
    pub fn inherits(&self) -> &[Attr] {
        &self.inherits
    }

    pub fn url_strategy(&self) -> UrlStrategy {
        self.url
    }
}

/// Builder for a [`ModelSpec`].
#[derive(Debug)]
pub struct ModelBuilder {
    spec: ModelSpec,
}

impl ModelBuilder {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            spec: ModelSpec {
                kind,
                doc: None,
                fields: Vec::new(),
                base_len: 0,
                key: None,
                inherits: Vec::new(),
                url: UrlStrategy::Keyed,
            },
        }
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.spec.doc = Some(doc);
        self
    }

    /// Add base-type fields ahead of every field declared on this type.
    pub fn extends(mut self, base: Vec<Field>) -> Self {
        for field in base {
            let at = self.spec.base_len;
            if let Some(pos) = self.position(field.name()) {
                if pos >= at {
                    // Declared on this type already: the derived field wins.
                    continue;
                }
                self.spec.fields[pos] = field;
            } else {
                self.spec.fields.insert(at, field);
                self.spec.base_len += 1;
            }
        }
        self
    }

    /// Declare a field; replaces a base field of the same name in place.
    pub fn field(mut self, field: Field) -> Self {
        match self.position(field.name()) {
            Some(pos) => self.spec.fields[pos] = field,
            None => self.spec.fields.push(field),
        }
        self
    }

    pub fn key(mut self, name: &'static str, source: KeySource) -> Self {
        self.spec.key = Some((name, source));
        self
    }

    pub fn inherits(mut self, attrs: &[Attr]) -> Self {
        self.spec.inherits = attrs.to_vec();
        self
    }

    pub fn url(mut self, strategy: UrlStrategy) -> Self {
        self.spec.url = strategy;
        self
    }

    pub fn build(self) -> ModelSpec {
        self.spec
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.spec.fields.iter().position(|f| f.name() == name)
    }
}

/// Specs of every known node type.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: HashMap<ModelKind, ModelSpec>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec, replacing any previous spec of the same type.
    pub fn register(&mut self, spec: ModelSpec) {
        self.specs.insert(spec.kind(), spec);
    }

    pub fn with(mut self, spec: ModelSpec) -> Self {
        self.register(spec);
        self
    }

    /// Spec of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownModel`] if the type was never registered.
    pub fn spec(&self, kind: ModelKind) -> Result<&ModelSpec, ModelError> {
        self.specs.get(&kind).ok_or(ModelError::UnknownModel(kind))
    }

    pub fn contains(&self, kind: ModelKind) -> bool {
        self.specs.contains_key(&kind)
    }

    /// Registered types in [`ModelKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = ModelKind> + '_ {
        ModelKind::ALL.into_iter().filter(|k| self.specs.contains_key(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::convert::Converter;

    fn sourced() -> Vec<Field> {
        vec![
            Field::new("source_file", Converter::Str).optional(),
            Field::new("edit_info", Converter::Any).optional().output_only(),
        ]
    }

    #[test]
    fn base_fields_come_first() {
        let spec = ModelBuilder::new(ModelKind::Session)
            .field(Field::new("slug", Converter::Str))
            .field(Field::new("title", Converter::Str))
            .extends(sourced())
            .build();
        let names: Vec<_> = spec.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["source_file", "edit_info", "slug", "title"]);
    }

    #[test]
    fn derived_field_overrides_base() {
        let spec = ModelBuilder::new(ModelKind::Page)
            .extends(sourced())
            .field(Field::new("source_file", Converter::Str))
            .build();
        assert_eq!(spec.fields().len(), 2);
        assert!(spec.field("source_file").unwrap().required_in(crate::core::types::SchemaView::Input));
        assert_eq!(spec.fields()[0].name(), "source_file");
    }

    #[test]
    fn unknown_models_are_errors() {
        let registry = Registry::new().with(ModelBuilder::new(ModelKind::License).build());
        assert!(registry.spec(ModelKind::License).is_ok());
        assert!(matches!(
            registry.spec(ModelKind::Course),
            Err(ModelError::UnknownModel(ModelKind::Course))
        ));
        assert_eq!(registry.kinds().collect::<Vec<_>>(), vec![ModelKind::License]);
    }

    #[test]
    fn key_from_field() {
        let mut node = Node::new(ModelKind::Page, Some(NodeId::ROOT), None, None, Default::default());
        node.fields.insert("slug", "index".into());
        assert_eq!(KeySource::Field("slug").value_of(&node).as_deref(), Some("index"));
        assert_eq!(KeySource::Construct.value_of(&node), None);
    }
}
