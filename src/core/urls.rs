//! core::urls
//!
//! URL-builder table injected into a [`Root`](crate::core::graph::Root).
//!
//! # Design
//!
//! The engine never constructs URLs itself. Routing is owned by whoever
//! builds the table: each `(UrlKind, ModelKind)` pair maps to a builder that
//! receives the node's primary-key chain and an "external" (absolute URL)
//! flag. A parallel builder produces schema URLs.
//!
//! A missing builder is an ordinary condition, not a bug. Callers asking for
//! the URL of a reference-only node must treat [`UrlError`] as "no link
//! available".
//!
//! # Example
//!
//! ```
//! use syllabus::core::types::{ModelKind, Pks, UrlKind};
//! use syllabus::core::urls::{UrlError, UrlTable};
//!
//! let urls = UrlTable::new().with(UrlKind::Web, ModelKind::Course, |pks, _external| {
//!     format!("/course/{}/", pks["course_slug"])
//! });
//!
//! let mut pks = Pks::new();
//! pks.insert("course_slug", "mi-pyt".to_string());
//! assert_eq!(
//!     urls.url_for(UrlKind::Web, ModelKind::Course, &pks, false).unwrap(),
//!     "/course/mi-pyt/"
//! );
//! assert_eq!(
//!     urls.url_for(UrlKind::Api, ModelKind::Course, &pks, false),
//!     Err(UrlError::NoUrlType(UrlKind::Api))
//! );
//! assert_eq!(
//!     urls.url_for(UrlKind::Web, ModelKind::License, &pks, false),
//!     Err(UrlError::NoUrl(ModelKind::License))
//! );
//! ```

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::types::{ModelKind, Pks, SchemaView, UrlKind};

/// Builds a URL from a primary-key chain and the "external" flag.
pub type UrlBuilder = Box<dyn Fn(&Pks, bool) -> String>;

/// Builds the URL of a model's schema in the given view.
pub type SchemaUrlBuilder = Box<dyn Fn(ModelKind, SchemaView, bool) -> String>;

/// A node has no URL of the requested kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    /// No builder exists for the node type at all.
    #[error("no URL for {0}")]
    NoUrl(ModelKind),

    /// The node type has URLs, but not of the requested kind.
    #[error("no {0} URL available")]
    NoUrlType(UrlKind),
}

impl UrlError {
    /// Both variants mean "no link available" rather than a defect.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, UrlError::NoUrl(_) | UrlError::NoUrlType(_))
    }
}

/// Table of URL builders keyed by `(url kind, model type)`.
#[derive(Default)]
pub struct UrlTable {
    builders: HashMap<UrlKind, HashMap<ModelKind, UrlBuilder>>,
    schema: Option<SchemaUrlBuilder>,
}

impl UrlTable {
    /// Create an empty table; every lookup fails with [`UrlError`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder, returning the table for chaining.
    pub fn with(
        mut self,
        kind: UrlKind,
        model: ModelKind,
        builder: impl Fn(&Pks, bool) -> String + 'static,
    ) -> Self {
        self.insert(kind, model, builder);
        self
    }

    /// Register a builder, replacing any previous one for the same pair.
    pub fn insert(
        &mut self,
        kind: UrlKind,
        model: ModelKind,
        builder: impl Fn(&Pks, bool) -> String + 'static,
    ) {
        self.builders
            .entry(kind)
            .or_default()
            .insert(model, Box::new(builder));
    }

    /// Register the schema URL builder.
    pub fn with_schema_urls(
        mut self,
        builder: impl Fn(ModelKind, SchemaView, bool) -> String + 'static,
    ) -> Self {
        self.schema = Some(Box::new(builder));
        self
    }

    /// Build a table from path templates such as `/course/{course_slug}/`.
    ///
    /// Placeholders are replaced by the matching primary key. External URLs
    /// are prefixed with `base_url`; internal ones are the bare path.
    pub fn from_templates<'a>(
        base_url: &str,
        templates: impl IntoIterator<Item = (UrlKind, ModelKind, &'a str)>,
    ) -> Self {
        let mut table = Self::new();
        for (kind, model, template) in templates {
            let base = base_url.trim_end_matches('/').to_string();
            let template = template.to_string();
            table.insert(kind, model, move |pks, external| {
                let path = expand_template(&template, pks);
                if external {
                    format!("{base}{path}")
                } else {
                    path
                }
            });
        }
        table
    }

    /// Look up the builder for `(kind, model)` and invoke it.
    ///
    /// # Errors
    ///
    /// - [`UrlError::NoUrlType`] if `model` has builders, but none for `kind`
    ///   (or no builder of `kind` exists at all)
    /// - [`UrlError::NoUrl`] if `model` has no builder of any kind
    pub fn url_for(
        &self,
        kind: UrlKind,
        model: ModelKind,
        pks: &Pks,
        external: bool,
    ) -> Result<String, UrlError> {
        let Some(by_model) = self.builders.get(&kind) else {
            return Err(UrlError::NoUrlType(kind));
        };
        if let Some(builder) = by_model.get(&model) {
            return Ok(builder(pks, external));
        }
        if self.has_any(model) {
            Err(UrlError::NoUrlType(kind))
        } else {
            Err(UrlError::NoUrl(model))
        }
    }

    /// URL of the schema for `model`, if a schema URL builder is registered.
    pub fn schema_url(&self, model: ModelKind, view: SchemaView, external: bool) -> Option<String> {
        self.schema.as_ref().map(|builder| builder(model, view, external))
    }

    fn has_any(&self, model: ModelKind) -> bool {
        self.builders.values().any(|m| m.contains_key(&model))
    }
}

impl fmt::Debug for UrlTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<(UrlKind, ModelKind)> = self
            .builders
            .iter()
            .flat_map(|(kind, models)| models.keys().map(move |model| (*kind, *model)))
            .collect();
        registered.sort_by_key(|(kind, model)| (kind.as_str(), *model));
        f.debug_struct("UrlTable")
            .field("registered", &registered)
            .field("schema", &self.schema.is_some())
            .finish()
    }
}

/// Replace `{name}` placeholders with primary keys; unknown ones stay verbatim.
pub fn expand_template(template: &str, pks: &Pks) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match pks.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Placeholder names used by a template.
pub fn template_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        names.push(&after[..close]);
        rest = &after[close + 1..];
    }
    names
}
