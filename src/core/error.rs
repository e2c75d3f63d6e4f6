//! core::error
//!
//! Error taxonomy of the load/dump/schema engine.
//!
//! Every error is local to the node or course being processed. Nothing is
//! retried and no failing course is skipped: broken content must surface at
//! build time instead of being served.

use thiserror::Error;

use super::types::{ModelKind, SchemaView};
use super::urls::UrlError;
use crate::render::RenderError;

/// Errors from loading, dumping and resolving the content graph.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No spec is registered for the node type.
    #[error("no model registered for {0}")]
    UnknownModel(ModelKind),

    /// A required field is absent from the raw input.
    #[error("{model}: missing required field '{field}'")]
    MissingField {
        model: ModelKind,
        field: &'static str,
    },

    /// A raw value does not match the field's expected shape.
    #[error("{model}.{path}: {message}")]
    Conversion {
        model: ModelKind,
        path: String,
        message: String,
    },

    /// An embedded page/solution/static-file link cannot be resolved.
    #[error("cannot resolve content reference '{identifier}': {reason}")]
    ContentReference { identifier: String, reason: String },

    /// The node has no URL of the requested kind. Recoverable.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// Lessons kept requesting further lessons past the round limit.
    #[error("lessons in course {course} are linked too deeply")]
    LinkDepthExceeded { course: String },

    /// A course that no longer accepts lazy loading was asked to load.
    #[error("course {course} is frozen")]
    Frozen { course: String },

    /// A keyed lookup failed.
    #[error("{kind} '{key}' not found")]
    NotFound { kind: ModelKind, key: String },

    /// Two siblings share a primary key.
    #[error("duplicate {kind} key '{key}'")]
    DuplicateKey { kind: ModelKind, key: String },

    /// Data does not conform to the generated schema.
    #[error("{view} data does not match the {model} schema: {}", errors.join("; "))]
    Schema {
        model: ModelKind,
        view: SchemaView,
        errors: Vec<String>,
    },

    /// The external content renderer failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ModelError {
    /// Whether this is the recoverable "no link available" condition.
    pub fn is_missing_url(&self) -> bool {
        matches!(self, ModelError::Url(e) if e.is_recoverable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::UrlKind;

    #[test]
    fn url_errors_are_recoverable() {
        let err: ModelError = UrlError::NoUrlType(UrlKind::Api).into();
        assert!(err.is_missing_url());
        let err = ModelError::NotFound {
            kind: ModelKind::Lesson,
            key: "beginners/install".into(),
        };
        assert!(!err.is_missing_url());
    }

    #[test]
    fn messages_name_the_model_and_field() {
        let err = ModelError::MissingField {
            model: ModelKind::Session,
            field: "title",
        };
        assert_eq!(err.to_string(), "Session: missing required field 'title'");

        let err = ModelError::Schema {
            model: ModelKind::Course,
            view: SchemaView::Input,
            errors: vec!["/title: 1 is not of type \"string\"".into()],
        };
        assert!(err.to_string().starts_with("input data does not match the Course schema"));
    }
}
