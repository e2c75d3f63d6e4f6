//! core::types
//!
//! Strong types for core engine concepts.
//!
//! # Types
//!
//! - [`NodeId`] - Handle of a node in the content graph arena
//! - [`ModelKind`] - The closed set of node types the engine knows
//! - [`UrlKind`] - Which family of URL is requested (web page or API document)
//! - [`SchemaView`] - Input (authored data) or output (served data) schema view
//! - [`Pks`] - Ancestor-qualified primary key chain of a node
//! - [`ApiVersion`] - `[major, minor]` version pair of the served data
//!
//! # Examples
//!
//! ```
//! use syllabus::core::types::{ApiVersion, ModelKind, UrlKind};
//!
//! assert_eq!("Course".parse::<ModelKind>().unwrap(), ModelKind::Course);
//! assert!("Spaceship".parse::<ModelKind>().is_err());
//! assert_eq!("api".parse::<UrlKind>().unwrap(), UrlKind::Api);
//! assert_eq!(ApiVersion::new(0, 4).to_string(), "0.4");
//! ```

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing type names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("unknown URL kind '{0}', expected 'web' or 'api'")]
    UnknownUrlKind(String),

    #[error("unknown schema view '{0}', expected 'input' or 'output'")]
    UnknownView(String),
}

/// Handle of a node in a [`Root`](crate::core::graph::Root) arena.
///
/// Ids are only meaningful for the root that minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node. Every graph starts with it.
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node types of the content graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    Root,
    License,
    Course,
    RunYear,
    Session,
    SessionPage,
    Material,
    Lesson,
    Page,
    Solution,
    StaticFile,
}

impl ModelKind {
    /// Every node type, in schema `definitions` order.
    pub const ALL: [ModelKind; 11] = [
        ModelKind::Root,
        ModelKind::License,
        ModelKind::Course,
        ModelKind::RunYear,
        ModelKind::Session,
        ModelKind::SessionPage,
        ModelKind::Material,
        ModelKind::Lesson,
        ModelKind::Page,
        ModelKind::Solution,
        ModelKind::StaticFile,
    ];

    /// Name used for schema definitions and configuration keys.
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Root => "Root",
            ModelKind::License => "License",
            ModelKind::Course => "Course",
            ModelKind::RunYear => "RunYear",
            ModelKind::Session => "Session",
            ModelKind::SessionPage => "SessionPage",
            ModelKind::Material => "Material",
            ModelKind::Lesson => "Lesson",
            ModelKind::Page => "Page",
            ModelKind::Solution => "Solution",
            ModelKind::StaticFile => "StaticFile",
        }
    }
}

impl FromStr for ModelKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| TypeError::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Family of URL requested for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlKind {
    /// Human-facing HTML page
    Web,
    /// Machine-facing JSON document
    Api,
}

impl UrlKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UrlKind::Web => "web",
            UrlKind::Api => "api",
        }
    }
}

impl FromStr for UrlKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(UrlKind::Web),
            "api" => Ok(UrlKind::Api),
            other => Err(TypeError::UnknownUrlKind(other.to_string())),
        }
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the wire a schema describes.
///
/// Input schemas validate author-supplied data as produced by the renderer.
/// Output schemas validate served data, where nested nodes may be replaced
/// by `{"$ref": url}` links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaView {
    Input,
    Output,
}

impl SchemaView {
    pub fn is_input(self) -> bool {
        self == SchemaView::Input
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaView::Input => "input",
            SchemaView::Output => "output",
        }
    }
}

impl FromStr for SchemaView {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "input" => Ok(SchemaView::Input),
            "output" => Ok(SchemaView::Output),
            other => Err(TypeError::UnknownView(other.to_string())),
        }
    }
}

impl fmt::Display for SchemaView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered primary keys of a node and its ancestors, root first.
///
/// A page yields `course_slug`, `lesson_slug`, `page_slug`.
pub type Pks = IndexMap<&'static str, String>;

/// Version of the served data and its schema.
///
/// The minor counter is bumped on every backwards-compatible schema change;
/// the major counter on changes to required-ness or shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    /// Version of the schema produced by this crate.
    pub const CURRENT: ApiVersion = ApiVersion { major: 0, minor: 4 };

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl From<[u32; 2]> for ApiVersion {
    fn from([major, minor]: [u32; 2]) -> Self {
        Self { major, minor }
    }
}

impl From<ApiVersion> for [u32; 2] {
    fn from(version: ApiVersion) -> Self {
        [version.major, version.minor]
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
