//! render::mock
//!
//! Mock renderer for deterministic testing.
//!
//! # Design
//!
//! Content lives in memory and every call is recorded, so tests can assert
//! how many fetch rounds a load needed and which slugs each round asked
//! for. A single call kind can be configured to fail.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use syllabus::render::mock::{MockCall, MockRenderer};
//! use syllabus::render::Renderer;
//!
//! let renderer = MockRenderer::new()
//!     .with_lesson("beginners/install", json!({"static_files": {}, "pages": {}}));
//!
//! let got = renderer.lessons(&["beginners/install".to_string()], &json!({})).unwrap();
//! assert_eq!(got.len(), 1);
//! assert_eq!(
//!     renderer.calls(),
//!     vec![MockCall::Lessons(vec!["beginners/install".to_string()])]
//! );
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use serde_json::Value as Json;

use super::{RenderError, Renderer};

/// Mock renderer for testing.
///
/// Clones share state, so a test can keep a handle after moving the
/// renderer into a `Root`.
#[derive(Debug, Clone, Default)]
pub struct MockRenderer {
    inner: Arc<Mutex<MockRendererInner>>,
}

#[derive(Debug, Default)]
struct MockRendererInner {
    courses: HashMap<String, Json>,
    lessons: HashMap<String, Json>,
    extras: HashMap<String, Json>,
    licenses: IndexMap<String, Json>,
    fail_on: Option<FailOn>,
    calls: Vec<MockCall>,
}

/// Which call should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    Course(RenderError),
    Lessons(RenderError),
    ExtraLesson(RenderError),
    Licenses(RenderError),
}

/// A recorded renderer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Course(String),
    /// Slugs of one batch, in request order
    Lessons(Vec<String>),
    ExtraLesson { course: String, slug: String },
    Licenses,
}

impl MockRenderer {
    /// Create an empty mock renderer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_course(self, slug: &str, data: Json) -> Self {
        self.lock().courses.insert(slug.to_string(), data);
        self
    }

    pub fn with_lesson(self, slug: &str, data: Json) -> Self {
        self.lock().lessons.insert(slug.to_string(), data);
        self
    }

    pub fn with_extra(self, slug: &str, data: Json) -> Self {
        self.lock().extras.insert(slug.to_string(), data);
        self
    }

    pub fn with_license(self, slug: &str, data: Json) -> Self {
        self.lock().licenses.insert(slug.to_string(), data);
        self
    }

    /// Configure a call kind to fail.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded lesson batches.
    pub fn lesson_rounds(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, MockCall::Lessons(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockRendererInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, call: MockCall) -> Option<RenderError> {
        let mut inner = self.lock();
        let failure = match (&inner.fail_on, &call) {
            (Some(FailOn::Course(e)), MockCall::Course(_))
            | (Some(FailOn::Lessons(e)), MockCall::Lessons(_))
            | (Some(FailOn::ExtraLesson(e)), MockCall::ExtraLesson { .. })
            | (Some(FailOn::Licenses(e)), MockCall::Licenses) => Some(e.clone()),
            _ => None,
        };
        inner.calls.push(call);
        failure
    }
}

impl Renderer for MockRenderer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn course(&self, slug: &str) -> Result<Json, RenderError> {
        if let Some(e) = self.record(MockCall::Course(slug.to_string())) {
            return Err(e);
        }
        self.lock()
            .courses
            .get(slug)
            .cloned()
            .ok_or_else(|| RenderError::CourseNotFound(slug.to_string()))
    }

    fn lessons(&self, slugs: &[String], _vars: &Json) -> Result<IndexMap<String, Json>, RenderError> {
        if let Some(e) = self.record(MockCall::Lessons(slugs.to_vec())) {
            return Err(e);
        }
        let inner = self.lock();
        slugs
            .iter()
            .map(|slug| {
                inner
                    .lessons
                    .get(slug)
                    .map(|data| (slug.clone(), data.clone()))
                    .ok_or_else(|| RenderError::LessonNotFound(slug.clone()))
            })
            .collect()
    }

    fn extra_lesson(&self, course: &str, slug: &str, _vars: &Json) -> Result<Json, RenderError> {
        let call = MockCall::ExtraLesson {
            course: course.to_string(),
            slug: slug.to_string(),
        };
        if let Some(e) = self.record(call) {
            return Err(e);
        }
        self.lock()
            .extras
            .get(slug)
            .cloned()
            .ok_or_else(|| RenderError::MaterialNotFound {
                course: course.to_string(),
                slug: slug.to_string(),
            })
    }

    fn licenses(&self) -> Result<IndexMap<String, Json>, RenderError> {
        if let Some(e) = self.record(MockCall::Licenses) {
            return Err(e);
        }
        Ok(self.lock().licenses.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_state() {
        let renderer = MockRenderer::new().with_course("lessons", json!({"title": "Lessons"}));
        let handle = renderer.clone();
        renderer.course("lessons").unwrap();
        assert_eq!(handle.calls(), vec![MockCall::Course("lessons".into())]);
    }

    #[test]
    fn missing_lessons_fail_the_batch() {
        let renderer = MockRenderer::new().with_lesson("a", json!({}));
        let err = renderer
            .lessons(&["a".into(), "b".into()], &json!({}))
            .unwrap_err();
        assert_eq!(err, RenderError::LessonNotFound("b".into()));
        assert_eq!(renderer.lesson_rounds(), 1);
    }

    #[test]
    fn fail_on_only_hits_the_configured_call() {
        let renderer = MockRenderer::new()
            .with_license("cc0", json!({"title": "CC0"}))
            .fail_on(FailOn::Course(RenderError::CourseNotFound("x".into())));
        assert!(renderer.course("x").is_err());
        assert_eq!(renderer.licenses().unwrap().len(), 1);
        assert_eq!(renderer.calls().len(), 2);
    }
}
