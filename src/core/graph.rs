//! core::graph
//!
//! The content graph: an arena of nodes owned by [`Root`].
//!
//! # Architecture
//!
//! - Node 0 is the root; every other node has exactly one parent, fixed at
//!   construction, so ownership forms a tree
//! - cross-tree links (material to lesson, run year to course, page to
//!   license) are stored as [`Value::Node`] references resolved by key
//! - every node type is described by a [`ModelSpec`] in the shared
//!   [`Registry`]; load, dump and URL resolution are generic over it
//!
//! # Loading
//!
//! [`Root::load`] allocates the node, copies parent-derived attributes,
//! converts each declared field in order (nested nodes are loaded
//! recursively as children), then runs every after-load hook in field
//! declaration order.
//!
//! The arena only grows. A failed load leaves the nodes built so far in
//! place; they are never registered, so nothing reachable from the root
//! refers to them.
//!
//! # Dumping
//!
//! [`Root::dump`] always expands the requested node. In the output view it
//! adds `api_url` and `url` when the node has them, `api_version`, and the
//! schema URL, and validates the result against the output schema. Nested
//! nodes are abbreviated to `{"$ref": api_url}` when requested.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Map, Value as Json};
use tracing::debug;

use super::convert::{DumpCx, LoadCx};
use super::error::ModelError;
use super::field::{Missing, Visibility};
use super::lazy::CourseState;
use super::node::{Attr, Construct, Lineage, Node};
use super::registry::{Registry, UrlStrategy};
use super::schema::SchemaCache;
use super::types::{ApiVersion, ModelKind, NodeId, Pks, SchemaView, UrlKind};
use super::urls::UrlTable;
use super::value::Value;
use crate::models::sourced::RepoInfo;
use crate::render::Renderer;

/// How to dump a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    pub view: SchemaView,
    /// Replace nested nodes that have an API URL with `{"$ref": url}`
    pub abbreviate: bool,
}

impl DumpOptions {
    /// Fully expanded served data.
    pub fn output() -> Self {
        Self {
            view: SchemaView::Output,
            abbreviate: false,
        }
    }

    /// Served data with nested nodes abbreviated.
    pub fn abbreviated() -> Self {
        Self {
            view: SchemaView::Output,
            abbreviate: true,
        }
    }

    /// Data in the shape accepted by the input schema.
    pub fn input() -> Self {
        Self {
            view: SchemaView::Input,
            abbreviate: false,
        }
    }
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self::output()
    }
}

/// Top of the content graph and owner of every node.
pub struct Root {
    registry: Arc<Registry>,
    nodes: Vec<Node>,
    urls: UrlTable,
    pub(crate) renderer: Box<dyn Renderer>,
    api_version: ApiVersion,
    pub(crate) repo: Option<RepoInfo>,
    pub(crate) courses: HashMap<NodeId, CourseState>,
    schemas: SchemaCache,
}

impl Root {
    /// Create a graph holding only the root node.
    ///
    /// Root fields with a default or factory are initialized immediately.
    pub fn new(registry: Arc<Registry>, urls: UrlTable, renderer: Box<dyn Renderer>) -> Self {
        let mut root_node = Node::new(ModelKind::Root, None, None, None, Lineage::default());
        if let Ok(spec) = registry.spec(ModelKind::Root) {
            for field in spec.fields() {
                match field.missing() {
                    Missing::Default(value) => {
                        root_node.fields.insert(field.name(), value.clone());
                    }
                    Missing::Factory(factory) => {
                        let value = factory(&root_node);
                        root_node.fields.insert(field.name(), value);
                    }
                    Missing::Required | Missing::Optional => {}
                }
            }
        }
        Self {
            registry,
            nodes: vec![root_node],
            urls,
            renderer,
            api_version: ApiVersion::CURRENT,
            repo: None,
            courses: HashMap::new(),
            schemas: SchemaCache::new(),
        }
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Repository used to build edit links of sourced documents.
    pub fn with_repo_info(mut self, repo: RepoInfo) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    pub fn repo_info(&self) -> Option<&RepoInfo> {
        self.repo.as_ref()
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not minted by this root.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> ModelKind {
        self.node(id).kind()
    }

    /// Number of nodes in the arena, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Load a node of `kind` from raw data.
    ///
    /// # Errors
    ///
    /// - [`ModelError::MissingField`] for an absent required field
    /// - [`ModelError::Conversion`] for a malformed value
    /// - any error raised by a nested load or an after-load hook
    pub fn load(&mut self, kind: ModelKind, raw: &Json, construct: Construct) -> Result<NodeId, ModelError> {
        let registry = Arc::clone(&self.registry);
        let spec = registry.spec(kind)?;
        let Some(data) = raw.as_object() else {
            return Err(ModelError::Conversion {
                model: kind,
                path: String::new(),
                message: "expected an object".to_string(),
            });
        };

        let parent = self.node(construct.parent);
        let mut lineage = Lineage::default();
        for attr in spec.inherits() {
            let inherited = if parent.kind() == attr.kind() {
                Some(construct.parent)
            } else {
                parent.lineage().get(*attr)
            };
            lineage.set(*attr, inherited);
        }
        let id = NodeId::new(self.nodes.len());
        if let Some(own) = own_attr(kind) {
            lineage.set(own, Some(id));
        }
        self.nodes.push(Node::new(
            kind,
            Some(construct.parent),
            construct.key,
            construct.index,
            lineage,
        ));
        debug!(model = %kind, node = %id, parent = %construct.parent, "loading node");

        for field in spec.fields() {
            let raw_value = match field.visibility() {
                Visibility::OutputOnly => None,
                _ => data.get(field.key()).filter(|v| !v.is_null()),
            };
            let value = match raw_value {
                Some(raw_value) => {
                    let mut cx = LoadCx::new(self, id, field.key());
                    Some(field.converter().load(&mut cx, raw_value)?)
                }
                None => match field.missing() {
                    // Output-only required fields are provided by hooks.
                    Missing::Required if field.visibility() == Visibility::OutputOnly => None,
                    Missing::Required => {
                        return Err(ModelError::MissingField {
                            model: kind,
                            field: field.name(),
                        })
                    }
                    Missing::Optional => None,
                    Missing::Default(value) => Some(value.clone()),
                    Missing::Factory(factory) => Some(factory(self.node(id))),
                },
            };
            if let Some(value) = value {
                self.node_mut(id).fields.insert(field.name(), value);
            }
        }

        for field in spec.fields() {
            for hook in field.hooks() {
                hook(self, id)?;
            }
        }
        Ok(id)
    }

    /// Validate raw data against the schema of `kind`.
    pub fn validate(&self, kind: ModelKind, view: SchemaView, data: &Json) -> Result<(), ModelError> {
        self.schemas.validate(&self.registry, kind, view, data)
    }

    /// Set a field of a node under construction or of an open course.
    pub(crate) fn set_field(&mut self, id: NodeId, name: &'static str, value: Value) {
        self.node_mut(id).fields.insert(name, value);
    }

    /// Link a sequence of nodes with `prev`/`next` in order.
    pub(crate) fn link_siblings(&mut self, ids: &[NodeId]) {
        for (i, id) in ids.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| ids[p]);
            let next = ids.get(i + 1).copied();
            let node = self.node_mut(*id);
            node.prev = prev;
            node.next = next;
        }
    }

    /// Register `id` under `key` in the map field `name` of `owner`.
    pub(crate) fn register(
        &mut self,
        owner: NodeId,
        name: &'static str,
        key: String,
        id: NodeId,
    ) -> Result<(), ModelError> {
        let kind = self.kind(id);
        let owner_kind = self.kind(owner);
        let entry = self
            .node_mut(owner)
            .fields
            .entry(name)
            .or_insert_with(|| Value::Map(Default::default()));
        let Value::Map(map) = entry else {
            return Err(ModelError::Conversion {
                model: owner_kind,
                path: name.to_string(),
                message: "not a map".to_string(),
            });
        };
        if map.contains_key(&key) {
            return Err(ModelError::DuplicateKey { kind, key });
        }
        map.insert(key, Value::Node(id));
        Ok(())
    }

    /// Node of `kind` registered under `key` in a map field of the root.
    pub fn lookup(&self, kind: ModelKind, key: &str) -> Option<NodeId> {
        self.node(NodeId::ROOT)
            .fields
            .values()
            .filter_map(Value::as_map)
            .filter_map(|map| map.get(key).and_then(Value::as_node))
            .find(|id| self.kind(*id) == kind)
    }

    /// Keys of every node of `kind` registered on the root.
    pub fn keys(&self, kind: ModelKind) -> Vec<String> {
        self.node(NodeId::ROOT)
            .fields
            .values()
            .filter_map(Value::as_map)
            .flat_map(|map| map.iter())
            .filter(|(_, v)| v.as_node().is_some_and(|id| self.kind(id) == kind))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Primary key of a node, if its type has one.
    pub fn primary_key(&self, id: NodeId) -> Option<String> {
        let node = self.node(id);
        let spec = self.registry.spec(node.kind()).ok()?;
        spec.key_source()?.value_of(node)
    }

    /// Ancestor-qualified primary keys of a node, root first.
    pub fn pks(&self, id: NodeId) -> Pks {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            chain.push(c);
            current = self.node(c).parent();
        }
        let mut pks = Pks::new();
        for c in chain.into_iter().rev() {
            let node = self.node(c);
            let Ok(spec) = self.registry.spec(node.kind()) else {
                continue;
            };
            if let (Some(name), Some(value)) = (spec.key_name(), self.primary_key(c)) {
                pks.insert(name, value);
            }
        }
        pks
    }

    /// URL of a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Url`] if the node has no URL of this kind;
    /// callers should treat it as "no link available".
    pub fn url(&self, id: NodeId, kind: UrlKind, external: bool) -> Result<String, ModelError> {
        let model = self.kind(id);
        match self.registry.spec(model)?.url_strategy() {
            UrlStrategy::Keyed => self.url_for_pks(kind, model, &self.pks(id), external),
            UrlStrategy::Custom(resolve) => resolve(self, id, kind, external),
        }
    }

    /// URL of a node that may not be loaded yet, from its key chain.
    pub fn url_for_pks(
        &self,
        kind: UrlKind,
        model: ModelKind,
        pks: &Pks,
        external: bool,
    ) -> Result<String, ModelError> {
        Ok(self.urls.url_for(kind, model, pks, external)?)
    }

    /// URL of the schema of `model`, if schema URLs are configured.
    pub fn schema_url(&self, model: ModelKind, view: SchemaView, external: bool) -> Option<String> {
        self.urls.schema_url(model, view, external)
    }

    /// Dump a node; the node itself is always expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Schema`] if the produced data does not match
    /// the schema of the view, which indicates an engine defect.
    pub fn dump(&self, id: NodeId, options: DumpOptions) -> Result<Json, ModelError> {
        let kind = self.kind(id);
        let mut data = self.dump_body(id, options)?;
        if options.view == SchemaView::Output {
            data.insert("api_version".into(), json!(self.api_version));
        }
        let mut data = Json::Object(data);
        self.validate(kind, options.view, &data)?;
        if options.view == SchemaView::Output {
            if let (Some(url), Some(map)) = (self.schema_url(kind, options.view, true), data.as_object_mut()) {
                map.insert("$schema".into(), json!(url));
            }
        }
        Ok(data)
    }

    /// Dump a node nested inside another dump.
    pub fn dump_nested(&self, id: NodeId, options: DumpOptions) -> Result<Json, ModelError> {
        if options.abbreviate && options.view == SchemaView::Output {
            match self.url(id, UrlKind::Api, true) {
                Ok(url) => return Ok(json!({"$ref": url})),
                Err(e) if e.is_missing_url() => {}
                Err(e) => return Err(e),
            }
        }
        self.dump_body(id, options).map(Json::Object)
    }

    fn dump_body(&self, id: NodeId, options: DumpOptions) -> Result<Map<String, Json>, ModelError> {
        let node = self.node(id);
        let spec = self.registry.spec(node.kind())?;
        let mut data = Map::new();
        if options.view == SchemaView::Output {
            for (key, kind) in [("api_url", UrlKind::Api), ("url", UrlKind::Web)] {
                match self.url(id, kind, true) {
                    Ok(url) => {
                        data.insert(key.into(), json!(url));
                    }
                    Err(e) if e.is_missing_url() => {}
                    Err(e) => return Err(e),
                }
            }
        }
        let cx = DumpCx { root: self, options };
        for field in spec.fields() {
            if !field.included_in(options.view) {
                continue;
            }
            if let Some(value) = node.field(field.name()) {
                data.insert(field.key().to_string(), field.converter().dump(&cx, value)?);
            }
        }
        Ok(data)
    }
}

impl std::fmt::Debug for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Root")
            .field("nodes", &self.nodes.len())
            .field("urls", &self.urls)
            .field("renderer", &self.renderer.name())
            .field("api_version", &self.api_version)
            .field("courses", &self.courses.len())
            .finish()
    }
}

/// Parent-derived attribute provided by nodes of `kind` to their subtree.
fn own_attr(kind: ModelKind) -> Option<Attr> {
    match kind {
        ModelKind::Course => Some(Attr::Course),
        ModelKind::Session => Some(Attr::Session),
        ModelKind::Lesson => Some(Attr::Lesson),
        ModelKind::Page => Some(Attr::Page),
        _ => None,
    }
}
