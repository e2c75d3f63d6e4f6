//! core::node
//!
//! Node storage of the content graph.
//!
//! # Invariants
//!
//! - `parent` is set exactly once, at construction, and never changes
//! - parent-derived attributes ([`Lineage`]) are copied from the parent at
//!   construction so descendants reach their course or lesson without
//!   walking the parent chain
//! - field values are only written while the node is being loaded, by its
//!   own after-load hooks, or by the lazy course machinery while the course
//!   is still open

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

use super::types::{ModelKind, NodeId};
use super::value::Value;

/// Attributes a node may inherit from its parent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    Course,
    Session,
    Lesson,
    Page,
}

impl Attr {
    /// The node type that provides this attribute.
    pub fn kind(self) -> ModelKind {
        match self {
            Attr::Course => ModelKind::Course,
            Attr::Session => ModelKind::Session,
            Attr::Lesson => ModelKind::Lesson,
            Attr::Page => ModelKind::Page,
        }
    }
}

/// Parent-derived attributes of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lineage {
    pub course: Option<NodeId>,
    pub session: Option<NodeId>,
    pub lesson: Option<NodeId>,
    pub page: Option<NodeId>,
}

impl Lineage {
    pub fn get(&self, attr: Attr) -> Option<NodeId> {
        match attr {
            Attr::Course => self.course,
            Attr::Session => self.session,
            Attr::Lesson => self.lesson,
            Attr::Page => self.page,
        }
    }

    pub(crate) fn set(&mut self, attr: Attr, id: Option<NodeId>) {
        match attr {
            Attr::Course => self.course = id,
            Attr::Session => self.session = id,
            Attr::Lesson => self.lesson = id,
            Attr::Page => self.page = id,
        }
    }
}

/// Non-field construction arguments of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Construct {
    /// Owning node
    pub parent: NodeId,
    /// Key given by the owner (course slug, license slug)
    pub key: Option<String>,
    /// Position among siblings, when loaded from a sequence
    pub index: Option<usize>,
}

impl Construct {
    /// Construct a child of `parent` with no key or position.
    pub fn child(parent: NodeId) -> Self {
        Self {
            parent,
            key: None,
            index: None,
        }
    }

    /// Construct a child of `parent` known under `key`.
    pub fn keyed(parent: NodeId, key: impl Into<String>) -> Self {
        Self {
            parent,
            key: Some(key.into()),
            index: None,
        }
    }

    /// Set the position among siblings.
    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

/// One node of the content graph.
#[derive(Debug, Clone)]
pub struct Node {
    kind: ModelKind,
    parent: Option<NodeId>,
    key: Option<String>,
    index: Option<usize>,
    lineage: Lineage,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) fields: IndexMap<&'static str, Value>,
}

impl Node {
    pub(crate) fn new(
        kind: ModelKind,
        parent: Option<NodeId>,
        key: Option<String>,
        index: Option<usize>,
        lineage: Lineage,
    ) -> Self {
        Self {
            kind,
            parent,
            key,
            index,
            lineage,
            prev: None,
            next: None,
            fields: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Owning node; `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Key given at construction.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Position among siblings given at construction.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    /// Previous node in an ordered sibling sequence.
    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    /// Next node in an ordered sibling sequence.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Loaded value of a field, `None` if the field is absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of the fields currently holding a value, in assignment order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.field(name).and_then(Value::as_int)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.field(name).and_then(Value::as_date)
    }

    pub fn datetime(&self, name: &str) -> Option<NaiveDateTime> {
        self.field(name).and_then(Value::as_datetime)
    }

    /// Nodes held by a field (single node, list or map), in order.
    pub fn children(&self, name: &str) -> Vec<NodeId> {
        self.field(name).map(Value::nodes).unwrap_or_default()
    }

    /// Node held under `key` by a map field.
    pub fn child(&self, name: &str, key: &str) -> Option<NodeId> {
        self.field(name)
            .and_then(Value::as_map)
            .and_then(|map| map.get(key))
            .and_then(Value::as_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineage_get_set() {
        let mut lineage = Lineage::default();
        lineage.set(Attr::Lesson, Some(NodeId::new(4)));
        assert_eq!(lineage.get(Attr::Lesson), Some(NodeId::new(4)));
        assert_eq!(lineage.get(Attr::Course), None);
    }

    #[test]
    fn construct_builders() {
        let c = Construct::keyed(NodeId::ROOT, "mi-pyt").at(3);
        assert_eq!(c.key.as_deref(), Some("mi-pyt"));
        assert_eq!(c.index, Some(3));
        assert_eq!(Construct::child(NodeId::ROOT).key, None);
    }

    #[test]
    fn field_accessors() {
        let mut node = Node::new(ModelKind::Session, Some(NodeId::ROOT), None, Some(0), Lineage::default());
        node.fields.insert("slug", Value::from("intro"));
        node.fields.insert("index", Value::Int(0));
        assert_eq!(node.str("slug"), Some("intro"));
        assert_eq!(node.int("index"), Some(0));
        assert_eq!(node.str("index"), None);
        assert!(node.children("materials").is_empty());
    }
}
