//! core::field
//!
//! Declarative field descriptors.
//!
//! One [`Field`] drives three behaviors at once: loading (conversion plus
//! missing-key resolution and after-load hooks), schema generation in both
//! views, and dumping.
//!
//! # Missing keys
//!
//! Exactly one [`Missing`] policy applies when the key is absent from raw
//! input: fail, leave the field absent, use a default value, or call a
//! factory.

use std::fmt;

use super::convert::Converter;
use super::error::ModelError;
use super::graph::Root;
use super::node::Node;
use super::types::{NodeId, SchemaView};
use super::value::Value;

/// Runs once all fields of a node are assigned; may read the parent chain
/// and overwrite any field of the node under construction.
pub type AfterLoad = fn(&mut Root, NodeId) -> Result<(), ModelError>;

/// Produces a field value from the node under construction.
pub type Factory = fn(&Node) -> Value;

/// What happens when a field's key is missing from raw input.
#[derive(Clone)]
pub enum Missing {
    /// Loading fails with [`ModelError::MissingField`]
    Required,
    /// The field stays absent
    Optional,
    /// The given value is used
    Default(Value),
    /// The factory result is used
    Factory(Factory),
}

impl fmt::Debug for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Required => f.write_str("Required"),
            Missing::Optional => f.write_str("Optional"),
            Missing::Default(value) => f.debug_tuple("Default").field(value).finish(),
            Missing::Factory(_) => f.write_str("Factory"),
        }
    }
}

/// Which schema views and dumps include a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Both,
    /// Loaded from input, never served
    InputOnly,
    /// Computed by the engine, never read from input
    OutputOnly,
}

impl Visibility {
    pub fn includes(self, view: SchemaView) -> bool {
        match self {
            Visibility::Both => true,
            Visibility::InputOnly => view == SchemaView::Input,
            Visibility::OutputOnly => view == SchemaView::Output,
        }
    }
}

/// A named, converted attribute of a node type.
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    data_key: &'static str,
    converter: Converter,
    missing: Missing,
    visibility: Visibility,
    doc: Option<&'static str>,
    hooks: Vec<AfterLoad>,
}

impl Field {
    /// A required field stored under its own name.
    pub fn new(name: &'static str, converter: Converter) -> Self {
        Self {
            name,
            data_key: name,
            converter,
            missing: Missing::Required,
            visibility: Visibility::Both,
            doc: None,
            hooks: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.missing = Missing::Optional;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.missing = Missing::Default(value);
        self
    }

    pub fn factory(mut self, factory: Factory) -> Self {
        self.missing = Missing::Factory(factory);
        self
    }

    /// Read and write the field under a different raw key.
    pub fn data_key(mut self, key: &'static str) -> Self {
        self.data_key = key;
        self
    }

    pub fn output_only(mut self) -> Self {
        self.visibility = Visibility::OutputOnly;
        self
    }

    pub fn input_only(mut self) -> Self {
        self.visibility = Visibility::InputOnly;
        self
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn after_load(mut self, hook: AfterLoad) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> &'static str {
        self.data_key
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn missing(&self) -> &Missing {
        &self.missing
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn description(&self) -> Option<&'static str> {
        self.doc
    }

    pub fn hooks(&self) -> &[AfterLoad] {
        &self.hooks
    }

    /// Whether the field appears in the given schema view and dump.
    pub fn included_in(&self, view: SchemaView) -> bool {
        self.visibility.includes(view)
    }

    /// Whether the field is listed in `required` for the given view.
    ///
    /// Input data may omit anything with a fallback. Served data always
    /// carries every non-optional field.
    pub fn required_in(&self, view: SchemaView) -> bool {
        if !self.included_in(view) {
            return false;
        }
        match (&self.missing, view) {
            (Missing::Optional, _) => false,
            (Missing::Required, _) => true,
            (Missing::Default(_) | Missing::Factory(_), SchemaView::Input) => false,
            (Missing::Default(_) | Missing::Factory(_), SchemaView::Output) => true,
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("data_key", &self.data_key)
            .field("converter", &self.converter)
            .field("missing", &self.missing)
            .field("visibility", &self.visibility)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Factory for fields defaulting to an empty map.
pub fn empty_map(_: &Node) -> Value {
    Value::Map(Default::default())
}

/// Factory for fields defaulting to an empty list.
pub fn empty_list(_: &Node) -> Value {
    Value::List(Vec::new())
}

/// Factory for fields defaulting to an empty JSON object.
pub fn empty_object(_: &Node) -> Value {
    Value::Json(serde_json::Value::Object(Default::default()))
}

/// Factory for fields defaulting to the node's position among siblings.
pub fn position(node: &Node) -> Value {
    Value::Int(node.index().unwrap_or(0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_in_views() {
        let required = Field::new("title", Converter::Str);
        assert!(required.required_in(SchemaView::Input));
        assert!(required.required_in(SchemaView::Output));

        let optional = Field::new("subtitle", Converter::Str).optional();
        assert!(!optional.required_in(SchemaView::Input));
        assert!(!optional.required_in(SchemaView::Output));
    }

    #[test]
    fn factory_fields_required_only_in_output() {
        let field = Field::new("vars", Converter::Any).factory(empty_object);
        assert!(!field.required_in(SchemaView::Input));
        assert!(field.required_in(SchemaView::Output));

        let field = Field::new("index", Converter::Int).default_value(Value::Int(0));
        assert!(!field.required_in(SchemaView::Input));
        assert!(field.required_in(SchemaView::Output));
    }

    #[test]
    fn visibility_excludes_views() {
        let output_only = Field::new("start_date", Converter::Date).output_only();
        assert!(!output_only.included_in(SchemaView::Input));
        assert!(!output_only.required_in(SchemaView::Input));
        assert!(output_only.required_in(SchemaView::Output));

        let input_only = Field::new("draft", Converter::Str).input_only();
        assert!(input_only.required_in(SchemaView::Input));
        assert!(!input_only.required_in(SchemaView::Output));
    }

    #[test]
    fn data_key_defaults_to_name() {
        let field = Field::new("license_code", Converter::License);
        assert_eq!(field.key(), "license_code");
        assert_eq!(field.data_key("code_license").key(), "code_license");
    }
}
