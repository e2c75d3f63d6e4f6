//! models::root
//!
//! The root node: licenses, courses and the run-year index.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use serde_json::json;
use tracing::{debug, info};

use crate::core::convert::Converter;
use crate::core::error::ModelError;
use crate::core::field::{empty_map, Field};
use crate::core::graph::Root;
use crate::core::node::Construct;
use crate::core::registry::{ModelBuilder, ModelSpec, Registry};
use crate::core::types::{ModelKind, NodeId, SchemaView};
use crate::core::urls::UrlTable;
use crate::core::value::Value;
use crate::render::Renderer;

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::Root)
        .doc("Data for the course website: a collection of courses plus metadata")
        .field(
            Field::new("courses", Converter::dict(Converter::Model(ModelKind::Course)))
                .factory(empty_map)
                .doc("Courses keyed by slug"),
        )
        .field(
            Field::new("run_years", Converter::dict(Converter::Model(ModelKind::RunYear)))
                .factory(empty_map)
                .doc("Runs of courses grouped by calendar year"),
        )
        .field(Field::new("licenses", Converter::dict(Converter::Model(ModelKind::License))).factory(empty_map))
        .build()
}

impl Root {
    /// Create a root with the standard node types.
    pub fn standard(urls: UrlTable, renderer: Box<dyn Renderer>) -> Self {
        Root::new(Arc::new(Registry::standard()), urls, renderer)
    }

    /// Load one license and register it under `slug`.
    pub fn load_license(&mut self, slug: &str, raw: &serde_json::Value) -> Result<NodeId, ModelError> {
        if self.lookup(ModelKind::License, slug).is_some() {
            return Err(ModelError::DuplicateKey {
                kind: ModelKind::License,
                key: slug.to_string(),
            });
        }
        self.validate(ModelKind::License, SchemaView::Input, raw)?;
        let id = self.load(ModelKind::License, raw, Construct::keyed(NodeId::ROOT, slug))?;
        self.register(NodeId::ROOT, "licenses", slug.to_string(), id)?;
        debug!(license = slug, "loaded license");
        Ok(id)
    }

    /// Load every license the renderer knows about.
    pub fn load_licenses(&mut self) -> Result<Vec<NodeId>, ModelError> {
        let licenses = self.renderer.licenses()?;
        let mut ids = Vec::with_capacity(licenses.len());
        for (slug, raw) in &licenses {
            ids.push(self.load_license(slug, raw)?);
        }
        info!(count = ids.len(), "loaded licenses");
        Ok(ids)
    }

    /// Course registered under `slug`.
    pub fn course(&self, slug: &str) -> Result<NodeId, ModelError> {
        self.lookup(ModelKind::Course, slug).ok_or_else(|| ModelError::NotFound {
            kind: ModelKind::Course,
            key: slug.to_string(),
        })
    }

    /// All courses in load order.
    pub fn courses(&self) -> Vec<NodeId> {
        self.node(NodeId::ROOT).children("courses")
    }

    pub fn license(&self, slug: &str) -> Option<NodeId> {
        self.lookup(ModelKind::License, slug)
    }

    pub fn run_year(&self, year: i32) -> Option<NodeId> {
        self.node(NodeId::ROOT).child("run_years", &year.to_string())
    }

    /// Courses running in `year`; empty for years without runs.
    pub fn runs_from_year(&self, year: i32) -> Vec<NodeId> {
        self.run_year(year)
            .map(|id| self.node(id).children("runs"))
            .unwrap_or_default()
    }

    /// Rebuild the run-year index from the dates of non-canonical courses.
    ///
    /// A course belongs to every calendar year between its start and end
    /// date. Run years from an earlier call are reused for years that still
    /// have runs; years left without runs are detached from the root, but
    /// their nodes stay in the arena.
    pub fn index_run_years(&mut self) -> Result<Vec<NodeId>, ModelError> {
        let mut years: BTreeMap<i32, Vec<String>> = BTreeMap::new();
        for course in self.courses() {
            if self.is_canonical(course) {
                continue;
            }
            let node = self.node(course);
            let (Some(start), Some(end)) = (node.date("start_date"), node.date("end_date")) else {
                continue;
            };
            let Some(slug) = node.key() else {
                continue;
            };
            for year in start.year()..=end.year() {
                years.entry(year).or_default().push(slug.to_string());
            }
        }

        let previous = self
            .node(NodeId::ROOT)
            .field("run_years")
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_default();
        self.set_field(NodeId::ROOT, "run_years", Value::Map(Default::default()));
        let mut ids = Vec::with_capacity(years.len());
        for (year, runs) in years {
            let key = year.to_string();
            let id = match previous.get(&key).and_then(Value::as_node) {
                Some(id) => {
                    let courses = runs
                        .iter()
                        .filter_map(|slug| self.lookup(ModelKind::Course, slug))
                        .map(Value::Node)
                        .collect();
                    self.set_field(id, "runs", Value::List(courses));
                    id
                }
                None => {
                    let raw = json!({"year": year, "runs": runs});
                    self.load(ModelKind::RunYear, &raw, Construct::child(NodeId::ROOT))?
                }
            };
            self.register(NodeId::ROOT, "run_years", key, id)?;
            ids.push(id);
        }
        debug!(count = ids.len(), "indexed run years");
        Ok(ids)
    }

    /// Freeze every course.
    pub fn freeze(&mut self) -> Result<(), ModelError> {
        for course in self.courses() {
            self.freeze_course(course)?;
        }
        Ok(())
    }
}
