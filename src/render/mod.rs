//! render
//!
//! Seam to the external content renderer.
//!
//! # Architecture
//!
//! The engine never renders content itself. A [`Renderer`] hands it
//! already-shaped raw data: course data by slug, batches of lessons by slug,
//! single extra materials and the license catalogue. The engine treats all
//! of it as input to `Root::load` and validates it against the input schema.
//!
//! # Modules
//!
//! - [`json_dir`]: Reads pre-rendered JSON from a content directory
//! - [`mock`]: In-memory renderer for deterministic testing
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use syllabus::render::mock::MockRenderer;
//! use syllabus::render::Renderer;
//!
//! let renderer = MockRenderer::new()
//!     .with_course("courses/mi-pyt", json!({"title": "MI-PYT", "sessions": []}));
//!
//! assert_eq!(renderer.course("courses/mi-pyt").unwrap()["title"], "MI-PYT");
//! assert!(renderer.course("courses/nope").is_err());
//! ```

pub mod json_dir;
pub mod mock;

use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value as Json;
use thiserror::Error;

pub use json_dir::JsonDirRenderer;
pub use mock::MockRenderer;

/// Errors from the content renderer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// No course with this slug.
    #[error("course '{0}' not found")]
    CourseNotFound(String),

    /// No lesson with this slug.
    #[error("lesson '{0}' not found")]
    LessonNotFound(String),

    /// No extra material with this slug.
    #[error("material '{slug}' not found for course '{course}'")]
    MaterialNotFound { course: String, slug: String },

    /// Content could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    /// Slug would address a file outside the content tree.
    #[error("invalid slug '{0}'")]
    InvalidSlug(String),

    /// Content is not valid JSON.
    #[error("malformed content in {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Producer of raw course content.
pub trait Renderer {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Raw data of one course.
    fn course(&self, slug: &str) -> Result<Json, RenderError>;

    /// Raw data of several lessons, keyed by slug.
    ///
    /// `vars` are the rendering variables of the requesting course.
    fn lessons(&self, slugs: &[String], vars: &Json) -> Result<IndexMap<String, Json>, RenderError>;

    /// Raw data of one extra material offered by a course.
    fn extra_lesson(&self, course: &str, slug: &str, vars: &Json) -> Result<Json, RenderError>;

    /// Raw data of every known license, keyed by slug.
    fn licenses(&self) -> Result<IndexMap<String, Json>, RenderError>;
}
