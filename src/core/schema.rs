//! core::schema
//!
//! JSON Schema generation and validation.
//!
//! # Documents
//!
//! [`document`] produces a draft-06 document for one node type: a top-level
//! `$ref` to the type's definition plus a `definitions` map holding every
//! registered type in the same view, the `ref` object (`{"$ref": <uri>}`)
//! and the `api_version` pair.
//!
//! # Views
//!
//! - input: nested nodes must be inline; fields with a fallback are optional
//! - output: nested nodes may be abbreviated to a `ref`; input-only fields
//!   are excluded
//!
//! Validation goes through the `jsonschema` crate. Compiled validators are
//! cached per `(type, view)`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Map, Value as Json};

use super::error::ModelError;
use super::registry::{ModelSpec, Registry};
use super::types::{ModelKind, SchemaView};

/// Dialect of generated documents.
pub const DRAFT: &str = "http://json-schema.org/draft-06/schema#";

/// Name of the abbreviated-reference definition.
pub const REF_DEFINITION: &str = "ref";

/// Name of the version-pair definition.
pub const API_VERSION_DEFINITION: &str = "api_version";

/// Fragment referring to the definition of `kind`.
///
/// In the output view the nested node may also be an abbreviated reference.
pub fn model_ref(kind: ModelKind, view: SchemaView) -> Json {
    let inline = json!({"$ref": format!("#/definitions/{kind}")});
    match view {
        SchemaView::Input => inline,
        SchemaView::Output => json!({
            "anyOf": [inline, {"$ref": format!("#/definitions/{REF_DEFINITION}")}],
        }),
    }
}

/// Definition of one node type.
pub fn model_schema(spec: &ModelSpec, view: SchemaView) -> Json {
    let uri = json!({"type": "string", "format": "uri"});
    let mut properties = Map::new();
    properties.insert("url".into(), uri.clone());
    properties.insert("api_url".into(), uri.clone());
    properties.insert(
        "api_version".into(),
        json!({"$ref": format!("#/definitions/{API_VERSION_DEFINITION}")}),
    );
    properties.insert("$schema".into(), uri);

    let mut required = Vec::new();
    for field in spec.fields() {
        if !field.included_in(view) {
            continue;
        }
        let mut schema = field.converter().schema(view);
        if let (Some(doc), Json::Object(obj)) = (field.description(), &mut schema) {
            obj.insert("description".into(), json!(doc));
        }
        properties.insert(field.key().to_string(), schema);
        if field.required_in(view) {
            required.push(json!(field.key()));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("title".into(), json!(spec.kind().name()));
    if let Some(doc) = spec.doc() {
        schema.insert("description".into(), json!(doc));
    }
    schema.insert("additionalProperties".into(), json!(false));
    schema.insert("properties".into(), Json::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Json::Array(required));
    }
    Json::Object(schema)
}

/// Complete schema document for `kind` in the given view.
pub fn document(registry: &Registry, kind: ModelKind, view: SchemaView) -> Json {
    let mut definitions = Map::new();
    for other in registry.kinds() {
        if let Ok(spec) = registry.spec(other) {
            definitions.insert(other.name().to_string(), model_schema(spec, view));
        }
    }
    definitions.insert(
        REF_DEFINITION.to_string(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "required": ["$ref"],
            "properties": {
                "$ref": {"type": "string", "format": "uri"},
            },
        }),
    );
    definitions.insert(
        API_VERSION_DEFINITION.to_string(),
        json!({
            "type": "array",
            "items": {"type": "integer"},
            "minItems": 2,
            "maxItems": 2,
            "description": "Version of the information and of the schema, as [major, minor]. \
                The minor version is increased on every backwards-compatible change; \
                the major version on incompatible changes.",
        }),
    );
    json!({
        "$schema": DRAFT,
        "$ref": format!("#/definitions/{kind}"),
        "definitions": definitions,
    })
}

/// Compiled validators keyed by type and view.
#[derive(Default)]
pub struct SchemaCache {
    validators: RefCell<HashMap<(ModelKind, SchemaView), Rc<jsonschema::Validator>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `data` against the schema of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Schema`] listing every violation as
    /// `<instance path>: <message>`.
    pub fn validate(
        &self,
        registry: &Registry,
        kind: ModelKind,
        view: SchemaView,
        data: &Json,
    ) -> Result<(), ModelError> {
        let validator = self.validator(registry, kind, view)?;
        let errors: Vec<String> = validator
            .iter_errors(data)
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Schema {
                model: kind,
                view,
                errors,
            })
        }
    }

    fn validator(
        &self,
        registry: &Registry,
        kind: ModelKind,
        view: SchemaView,
    ) -> Result<Rc<jsonschema::Validator>, ModelError> {
        if let Some(v) = self.validators.borrow().get(&(kind, view)) {
            return Ok(Rc::clone(v));
        }
        let schema = document(registry, kind, view);
        let validator = jsonschema::validator_for(&schema).map_err(|e| ModelError::Schema {
            model: kind,
            view,
            errors: vec![format!("invalid schema: {e}")],
        })?;
        let validator = Rc::new(validator);
        self.validators
            .borrow_mut()
            .insert((kind, view), Rc::clone(&validator));
        Ok(validator)
    }
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache")
            .field("compiled", &self.validators.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::convert::Converter;
    use crate::core::field::{empty_object, Field};
    use crate::core::registry::ModelBuilder;

    fn registry() -> Registry {
        Registry::new()
            .with(
                ModelBuilder::new(ModelKind::License)
                    .doc("A license for content or code")
                    .field(Field::new("title", Converter::Str))
                    .field(Field::new("url", Converter::Url))
                    .build(),
            )
            .with(
                ModelBuilder::new(ModelKind::Lesson)
                    .field(Field::new("slug", Converter::Str))
                    .field(Field::new("vars", Converter::Any).factory(empty_object))
                    .field(Field::new("license", Converter::Model(ModelKind::License)))
                    .field(Field::new("draft", Converter::Str).optional().input_only())
                    .build(),
            )
    }

    #[test]
    fn required_lists_differ_by_view() {
        let registry = registry();
        let spec = registry.spec(ModelKind::Lesson).unwrap();
        let input = model_schema(spec, SchemaView::Input);
        let output = model_schema(spec, SchemaView::Output);
        assert_eq!(input["required"], json!(["slug", "license"]));
        assert_eq!(output["required"], json!(["slug", "vars", "license"]));
        assert!(input["properties"].get("draft").is_some());
        assert!(output["properties"].get("draft").is_none());
        assert_eq!(output["additionalProperties"], json!(false));
    }

    #[test]
    fn document_has_all_definitions() {
        let doc = document(&registry(), ModelKind::Lesson, SchemaView::Output);
        assert_eq!(doc["$schema"], json!(DRAFT));
        assert_eq!(doc["$ref"], json!("#/definitions/Lesson"));
        let defs = doc["definitions"].as_object().unwrap();
        let names: Vec<_> = defs.keys().map(String::as_str).collect();
        assert_eq!(names, ["License", "Lesson", "ref", "api_version"]);
        assert_eq!(defs["License"]["description"], json!("A license for content or code"));
    }

    #[test]
    fn validates_against_generated_schema() {
        let registry = registry();
        let cache = SchemaCache::new();
        let good = json!({
            "slug": "intro",
            "license": {"title": "CC0", "url": "https://creativecommons.org/publicdomain/zero/1.0/"},
        });
        cache
            .validate(&registry, ModelKind::Lesson, SchemaView::Input, &good)
            .unwrap();

        let abbreviated = json!({
            "slug": "intro",
            "vars": {},
            "license": {"$ref": "https://example.test/api/license.json"},
        });
        cache
            .validate(&registry, ModelKind::Lesson, SchemaView::Output, &abbreviated)
            .unwrap();
        assert!(cache
            .validate(&registry, ModelKind::Lesson, SchemaView::Input, &abbreviated)
            .is_err());
    }

    #[test]
    fn errors_name_the_failing_path() {
        let registry = registry();
        let cache = SchemaCache::new();
        let bad = json!({"slug": 3, "license": {"title": "x", "url": "https://x.test/"}});
        let err = cache
            .validate(&registry, ModelKind::Lesson, SchemaView::Input, &bad)
            .unwrap_err();
        match err {
            ModelError::Schema { errors, .. } => {
                assert!(errors.iter().any(|e| e.starts_with("/slug")), "{errors:?}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_properties_are_rejected() {
        let registry = registry();
        let cache = SchemaCache::new();
        let data = json!({"title": "CC0", "url": "https://x.test/", "color": "red"});
        assert!(cache
            .validate(&registry, ModelKind::License, SchemaView::Input, &data)
            .is_err());
    }
}
