//! models::course
//!
//! Courses and their lazily rendered lessons.
//!
//! # Lessons
//!
//! A course does not own its lessons' raw data; the renderer produces it on
//! demand. Lessons are requested while the course is open (by materials and
//! by page links inside other lessons) and fetched in batches, one batch per
//! round, until nothing is pending. [`Root::freeze_course`] requests every
//! lesson referenced by a material, resolves them, and closes the cache.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use syllabus::core::urls::UrlTable;
//! use syllabus::core::graph::Root;
//! use syllabus::render::MockRenderer;
//!
//! let renderer = MockRenderer::new().with_course("courses/mi-pyt", json!({
//!     "title": "MI-PYT",
//!     "sessions": [
//!         {"slug": "intro", "title": "Intro", "date": "2024-01-10", "materials": []},
//!     ],
//! }));
//! let mut root = Root::standard(UrlTable::new(), Box::new(renderer));
//! let course = root.load_course("courses/mi-pyt", true).unwrap();
//! root.freeze_course(course).unwrap();
//!
//! assert!(root.is_frozen(course));
//! assert_eq!(root.node(course).date("start_date").unwrap().to_string(), "2024-01-10");
//! ```

use serde_json::Value as Json;
use tracing::{debug, info, warn};

use crate::core::convert::Converter;
use crate::core::error::ModelError;
use crate::core::field::{empty_map, empty_object, Field};
use crate::core::graph::Root;
use crate::core::lazy::{CourseState, LessonHandle, NotLoaded, MAX_LINK_DEPTH};
use crate::core::node::Construct;
use crate::core::registry::{KeySource, ModelBuilder, ModelSpec};
use crate::core::types::{ModelKind, NodeId, SchemaView};
use crate::core::value::Value;
use crate::render::RenderError;

use super::sourced;

/// Slug of the course that lists course metadata.
pub const META_COURSE: &str = "courses/meta";

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::Course)
        .doc("Collection of sessions")
        .key("course_slug", KeySource::Construct)
        .extends(sourced::fields())
        .field(Field::new("title", Converter::Str))
        .field(Field::new("subtitle", Converter::Str).optional())
        .field(Field::new("description", Converter::Str).optional())
        .field(Field::new("long_description", Converter::Str).optional())
        .field(Field::new("vars", Converter::Any).factory(empty_object))
        .field(Field::new("place", Converter::Str).optional())
        .field(Field::new("time", Converter::Str).optional())
        .field(
            Field::new("default_time", Converter::TimeInterval)
                .optional()
                .doc("Default start and end time of sessions"),
        )
        .field(Field::new(
            "sessions",
            Converter::KeyAttrDict {
                item: ModelKind::Session,
                key_attr: "slug",
                index_key: "index",
            },
        ))
        .field(
            Field::new("start_date", Converter::Date)
                .optional()
                .output_only()
                .doc("Date when this course starts")
                .after_load(start_date),
        )
        .field(
            Field::new("end_date", Converter::Date)
                .optional()
                .output_only()
                .doc("Date when this course ends")
                .after_load(end_date),
        )
        .field(
            Field::new("derives", Converter::Str)
                .optional()
                .doc("Course this derives from (deprecated)"),
        )
        .field(
            Field::new("extra_materials", Converter::dict(Converter::Model(ModelKind::Material)))
                .output_only()
                .factory(empty_map)
                .doc("Materials offered outside of sessions"),
        )
        .build()
}

fn session_dates(root: &Root, course: NodeId) -> Vec<chrono::NaiveDate> {
    root.node(course)
        .children("sessions")
        .into_iter()
        .filter_map(|s| root.node(s).date("date"))
        .collect()
}

fn start_date(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    if let Some(date) = session_dates(root, id).into_iter().min() {
        root.set_field(id, "start_date", Value::Date(date));
    }
    Ok(())
}

fn end_date(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    if let Some(date) = session_dates(root, id).into_iter().max() {
        root.set_field(id, "end_date", Value::Date(date));
    }
    Ok(())
}

impl Root {
    /// Render, validate and load a course, registering it under `slug`.
    ///
    /// # Errors
    ///
    /// - [`ModelError::DuplicateKey`] if a course with this slug exists
    /// - [`ModelError::Schema`] if the rendered data is not valid input
    /// - any load error of the course or its sessions
    pub fn load_course(&mut self, slug: &str, canonical: bool) -> Result<NodeId, ModelError> {
        if self.lookup(ModelKind::Course, slug).is_some() {
            return Err(ModelError::DuplicateKey {
                kind: ModelKind::Course,
                key: slug.to_string(),
            });
        }
        let raw = self.renderer.course(slug)?;
        self.validate(ModelKind::Course, SchemaView::Input, &raw)?;
        if self.repo.is_none() {
            warn!(course = slug, "no repository info, edit links are omitted");
        }
        let id = self.load(ModelKind::Course, &raw, Construct::keyed(NodeId::ROOT, slug))?;
        self.courses.insert(
            id,
            CourseState {
                canonical,
                ..CourseState::default()
            },
        );
        self.register(NodeId::ROOT, "courses", slug.to_string(), id)?;
        info!(course = slug, canonical, "loaded course");
        Ok(id)
    }

    pub fn is_canonical(&self, course: NodeId) -> bool {
        self.courses.get(&course).is_some_and(|s| s.canonical)
    }

    pub fn is_frozen(&self, course: NodeId) -> bool {
        self.courses.get(&course).is_some_and(|s| s.lessons.is_frozen())
    }

    /// Whether this is the course holding course metadata.
    pub fn is_meta(&self, course: NodeId) -> bool {
        self.node(course).key() == Some(META_COURSE)
    }

    /// Course this one derives from, if it is loaded.
    pub fn base_course(&self, course: NodeId) -> Option<NodeId> {
        let derives = self.node(course).str("derives")?;
        self.lookup(ModelKind::Course, &format!("courses/{derives}"))
    }

    /// Loaded lesson of a course, without requesting it.
    pub fn loaded_lesson(&self, course: NodeId, slug: &str) -> Option<NodeId> {
        self.courses.get(&course).and_then(|s| s.lessons.get(slug))
    }

    /// Loaded lessons of a course, in load order.
    pub fn lessons(&self, course: NodeId) -> Vec<NodeId> {
        self.courses
            .get(&course)
            .map(|s| s.lessons.lessons().map(|(_, id)| id).collect())
            .unwrap_or_default()
    }

    /// Look up a lesson, queueing it for loading if the course is open.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if the course is frozen and the
    /// lesson was never loaded.
    pub fn request_lesson(&mut self, course: NodeId, slug: &str) -> Result<LessonHandle, ModelError> {
        self.courses
            .entry(course)
            .or_default()
            .lessons
            .request(slug)
            .map_err(|NotLoaded(key)| ModelError::NotFound {
                kind: ModelKind::Lesson,
                key,
            })
    }

    /// Fetch and load one batch of lessons.
    ///
    /// Already loaded slugs are skipped. Lessons loaded here may request
    /// further lessons; those are left pending.
    pub fn load_lessons(&mut self, course: NodeId, slugs: &[String]) -> Result<Vec<NodeId>, ModelError> {
        let course_slug = self.node(course).key().unwrap_or_default().to_string();
        if self.is_frozen(course) {
            return Err(ModelError::Frozen { course: course_slug });
        }
        let slugs: Vec<String> = slugs
            .iter()
            .filter(|slug| self.loaded_lesson(course, slug).is_none())
            .cloned()
            .collect();
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let vars = self
            .node(course)
            .field("vars")
            .and_then(Value::as_json)
            .cloned()
            .unwrap_or(Json::Null);
        let rendered = self.renderer.lessons(&slugs, &vars)?;

        let mut ids = Vec::with_capacity(slugs.len());
        for slug in &slugs {
            let raw = rendered
                .get(slug)
                .ok_or_else(|| RenderError::LessonNotFound(slug.clone()))?;
            self.validate(ModelKind::Lesson, SchemaView::Input, raw)?;
            let id = self.load(ModelKind::Lesson, raw, Construct::keyed(course, slug.clone()))?;
            self.courses
                .entry(course)
                .or_default()
                .lessons
                .insert(slug.clone(), id);
            debug!(course = %course_slug, lesson = %slug, "loaded lesson");
            ids.push(id);
        }
        Ok(ids)
    }

    /// Load pending lessons until none are left.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::LinkDepthExceeded`] if lessons are still
    /// pending after [`MAX_LINK_DEPTH`] rounds.
    pub fn resolve_lessons(&mut self, course: NodeId) -> Result<(), ModelError> {
        let mut rounds = 0;
        loop {
            let pending = self
                .courses
                .get(&course)
                .map(|s| s.lessons.pending())
                .unwrap_or_default();
            if pending.is_empty() {
                return Ok(());
            }
            if rounds == MAX_LINK_DEPTH {
                return Err(ModelError::LinkDepthExceeded {
                    course: self.node(course).key().unwrap_or_default().to_string(),
                });
            }
            rounds += 1;
            debug!(round = rounds, count = pending.len(), "fetching lessons");
            self.load_lessons(course, &pending)?;
        }
    }

    /// Resolve every lesson reachable from the course's materials and
    /// forbid further lazy loading. Idempotent.
    pub fn freeze_course(&mut self, course: NodeId) -> Result<(), ModelError> {
        if self.is_frozen(course) {
            return Ok(());
        }
        let course_node = self.node(course);
        let materials = course_node
            .children("sessions")
            .into_iter()
            .flat_map(|session| self.node(session).children("materials"))
            .chain(course_node.children("extra_materials"));
        let wanted: Vec<String> = materials
            .filter_map(|material| self.node(material).str("lesson_slug"))
            .map(str::to_string)
            .collect();
        for slug in &wanted {
            self.request_lesson(course, slug)?;
        }
        self.resolve_lessons(course)?;
        self.courses.entry(course).or_default().lessons.freeze();
        info!(
            course = self.node(course).key().unwrap_or_default(),
            lessons = self.lessons(course).len(),
            "froze course"
        );
        Ok(())
    }

    /// Material of a course by slug.
    ///
    /// Session materials are searched first, in session order, then extra
    /// materials. An unknown slug is rendered as a new extra material while
    /// the course is open.
    pub fn course_material(&mut self, course: NodeId, slug: &str) -> Result<NodeId, ModelError> {
        let in_session = self
            .node(course)
            .children("sessions")
            .into_iter()
            .find_map(|session| self.session_material(session, slug));
        if let Some(id) = in_session {
            return Ok(id);
        }
        if let Some(id) = self.node(course).child("extra_materials", slug) {
            return Ok(id);
        }
        if self.is_frozen(course) {
            return Err(ModelError::NotFound {
                kind: ModelKind::Material,
                key: slug.to_string(),
            });
        }
        let course_slug = self.node(course).key().unwrap_or_default().to_string();
        let vars = self
            .node(course)
            .field("vars")
            .and_then(Value::as_json)
            .cloned()
            .unwrap_or(Json::Null);
        let raw = self.renderer.extra_lesson(&course_slug, slug, &vars)?;
        self.validate(ModelKind::Material, SchemaView::Input, &raw)?;
        let id = self.load(ModelKind::Material, &raw, Construct::keyed(course, slug))?;
        self.register(course, "extra_materials", slug.to_string(), id)?;
        Ok(id)
    }
}
