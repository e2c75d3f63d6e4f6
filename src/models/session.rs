//! models::session
//!
//! Sessions of a course and their fixed front/back pages.

use chrono::NaiveTime;
use serde_json::json;

use crate::core::convert::Converter;
use crate::core::error::ModelError;
use crate::core::field::{empty_list, position, Field};
use crate::core::graph::Root;
use crate::core::node::{Attr, Construct};
use crate::core::registry::{KeySource, ModelBuilder, ModelSpec};
use crate::core::types::{ModelKind, NodeId};
use crate::core::value::{TimeInterval, Value};

use super::sourced;

/// Slugs of the pages every session has.
pub const SESSION_PAGES: &[&str] = &["front", "back"];

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::Session)
        .doc("A smaller collection of teaching materials, usually used for one meeting of an in-person course or a self-study lesson")
        .key("session_slug", KeySource::Field("slug"))
        .inherits(&[Attr::Course])
        .extends(sourced::fields())
        .field(Field::new("slug", Converter::Str).doc("Identifier of the session"))
        .field(Field::new("title", Converter::Str).doc("Human-readable title"))
        .field(
            Field::new("index", Converter::Int)
                .factory(position)
                .doc("Position of the session within the course"),
        )
        .field(
            Field::new("date", Converter::Date)
                .optional()
                .doc("The date when this session occurs (if it has a set time)"),
        )
        .field(
            Field::new("materials", Converter::list(Converter::Model(ModelKind::Material)))
                .factory(empty_list)
                .doc("The session's materials")
                .after_load(link_materials),
        )
        .field(
            Field::new("start_time", Converter::SessionTime)
                .optional()
                .doc("Time when this session starts")
                .after_load(combine_start_time),
        )
        .field(
            Field::new("end_time", Converter::SessionTime)
                .optional()
                .doc("Time when this session ends")
                .after_load(combine_end_time),
        )
        .field(
            Field::new("pages", Converter::dict(Converter::Model(ModelKind::SessionPage)))
                .output_only()
                .after_load(create_pages),
        )
        .build()
}

pub fn page_spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::SessionPage)
        .doc("Additional page of a session, such as the front or back cover")
        .key("page_slug", KeySource::Field("slug"))
        .inherits(&[Attr::Course, Attr::Session])
        .field(Field::new("slug", Converter::Choice(SESSION_PAGES)))
        .build()
}

/// Chain materials that are shown on this site; external links are skipped.
fn link_materials(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    let local: Vec<NodeId> = root
        .node(id)
        .children("materials")
        .into_iter()
        .filter(|m| !root.node(*m).has("external_url"))
        .collect();
    root.link_siblings(&local);
    Ok(())
}

fn combine_start_time(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    combine_time(root, id, "start_time", |interval| interval.start)
}

fn combine_end_time(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    combine_time(root, id, "end_time", |interval| interval.end)
}

/// Make a session time absolute when the session has a date.
///
/// A missing time falls back to the course's default time; a time of day is
/// attached to the session date. Without a date the value is left as is.
fn combine_time(
    root: &mut Root,
    id: NodeId,
    name: &'static str,
    bound: fn(&TimeInterval) -> NaiveTime,
) -> Result<(), ModelError> {
    let node = root.node(id);
    let Some(date) = node.date("date") else {
        return Ok(());
    };
    let combined = match node.field(name) {
        Some(Value::Time(time)) => Some(date.and_time(*time)),
        Some(_) => None,
        None => node
            .lineage()
            .course
            .and_then(|course| root.node(course).field("default_time"))
            .and_then(Value::as_interval)
            .map(|interval| date.and_time(bound(&interval))),
    };
    if let Some(datetime) = combined {
        root.set_field(id, name, Value::DateTime(datetime));
    }
    Ok(())
}

fn create_pages(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    let mut pages = indexmap::IndexMap::new();
    for slug in SESSION_PAGES {
        let page = root.load(
            ModelKind::SessionPage,
            &json!({"slug": slug}),
            Construct::keyed(id, *slug),
        )?;
        pages.insert(slug.to_string(), Value::Node(page));
    }
    root.set_field(id, "pages", Value::Map(pages));
    Ok(())
}

impl Root {
    /// Session of a course by slug.
    pub fn session(&self, course: NodeId, slug: &str) -> Result<NodeId, ModelError> {
        self.node(course)
            .child("sessions", slug)
            .ok_or_else(|| ModelError::NotFound {
                kind: ModelKind::Session,
                key: slug.to_string(),
            })
    }

    /// Material of a session by its slug; materials without a slug are
    /// never matched.
    pub fn session_material(&self, session: NodeId, slug: &str) -> Option<NodeId> {
        self.node(session)
            .children("materials")
            .into_iter()
            .find(|m| self.node(*m).str("slug") == Some(slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::urls::UrlTable;
    use crate::render::mock::MockRenderer;
    use chrono::NaiveDate;

    fn course(sessions: serde_json::Value, default_time: Option<serde_json::Value>) -> (Root, NodeId) {
        let mut data = json!({"title": "Course", "sessions": sessions});
        if let Some(default_time) = default_time {
            data["default_time"] = default_time;
        }
        let renderer = MockRenderer::new().with_course("2024/test", data);
        let mut root = Root::standard(UrlTable::new(), Box::new(renderer));
        let id = root.load_course("2024/test", false).unwrap();
        (root, id)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Value {
        Value::DateTime(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap())
    }

    #[test]
    fn default_time_fills_missing_times() {
        let (root, course) = course(
            json!([{"slug": "a", "title": "A", "date": "2024-01-10"}]),
            Some(json!({"start": "09:00", "end": "12:00"})),
        );
        let session = root.node(root.session(course, "a").unwrap());
        assert_eq!(session.field("start_time"), Some(&at(2024, 1, 10, 9, 0)));
        assert_eq!(session.field("end_time"), Some(&at(2024, 1, 10, 12, 0)));
    }

    #[test]
    fn time_of_day_joins_the_date() {
        let (root, course) = course(
            json!([{"slug": "a", "title": "A", "date": "2024-01-10", "start_time": "18:30"}]),
            Some(json!({"start": "09:00", "end": "12:00"})),
        );
        let session = root.node(root.session(course, "a").unwrap());
        assert_eq!(session.field("start_time"), Some(&at(2024, 1, 10, 18, 30)));
        assert_eq!(session.field("end_time"), Some(&at(2024, 1, 10, 12, 0)));
    }

    #[test]
    fn undated_sessions_keep_raw_times() {
        let (root, course) = course(
            json!([{"slug": "a", "title": "A", "start_time": "18:30"}]),
            Some(json!({"start": "09:00", "end": "12:00"})),
        );
        let session = root.node(root.session(course, "a").unwrap());
        assert_eq!(
            session.field("start_time"),
            Some(&Value::Time(NaiveTime::from_hms_opt(18, 30, 0).unwrap()))
        );
        assert!(!session.has("end_time"));
    }

    #[test]
    fn sessions_are_indexed_and_linked() {
        let (root, course) = course(
            json!([
                {"slug": "a", "title": "A"},
                {"slug": "b", "title": "B"},
            ]),
            None,
        );
        let a = root.session(course, "a").unwrap();
        let b = root.session(course, "b").unwrap();
        assert_eq!(root.node(a).int("index"), Some(0));
        assert_eq!(root.node(b).int("index"), Some(1));
        assert_eq!(root.node(a).next(), Some(b));
        assert_eq!(root.node(b).prev(), Some(a));
        assert_eq!(root.node(a).lineage().course, Some(course));
    }

    #[test]
    fn every_session_has_front_and_back_pages() {
        let (root, course) = course(json!([{"slug": "a", "title": "A"}]), None);
        let session = root.session(course, "a").unwrap();
        let pages = root.node(session).children("pages");
        assert_eq!(pages.len(), 2);
        assert_eq!(root.node(pages[1]).str("slug"), Some("back"));
        assert_eq!(root.node(pages[1]).lineage().session, Some(session));
        assert_eq!(root.pks(pages[0]).get("page_slug").map(String::as_str), Some("front"));
    }

    #[test]
    fn external_materials_are_not_chained() {
        let (root, course) = course(
            json!([{"slug": "a", "title": "A", "materials": [
                {"type": "lesson", "lesson_slug": "beginners/install"},
                {"type": "link", "external_url": "https://python.cz/"},
                {"type": "lesson", "lesson_slug": "beginners/cmdline"},
            ]}]),
            None,
        );
        let session = root.session(course, "a").unwrap();
        let materials = root.node(session).children("materials");
        assert_eq!(root.node(materials[0]).next(), Some(materials[2]));
        assert_eq!(root.node(materials[2]).prev(), Some(materials[0]));
        assert_eq!(root.node(materials[1]).next(), None);
    }

    #[test]
    fn materials_are_found_by_slug() {
        let (root, course) = course(
            json!([{"slug": "a", "title": "A", "materials": [
                {"type": "link", "external_url": "https://python.cz/"},
                {"slug": "homework", "type": "homework", "lesson_slug": "beginners/homework"},
            ]}]),
            None,
        );
        let session = root.session(course, "a").unwrap();
        let materials = root.node(session).children("materials");
        assert_eq!(root.session_material(session, "homework"), Some(materials[1]));
        assert_eq!(root.session_material(session, "nope"), None);
    }

    #[test]
    fn duplicate_session_slugs_are_rejected() {
        let renderer = MockRenderer::new().with_course(
            "2024/test",
            json!({"title": "Course", "sessions": [
                {"slug": "a", "title": "A"},
                {"slug": "a", "title": "Again"},
            ]}),
        );
        let mut root = Root::standard(UrlTable::new(), Box::new(renderer));
        assert!(matches!(
            root.load_course("2024/test", false),
            Err(ModelError::DuplicateKey { kind: ModelKind::Session, .. })
        ));
        assert!(root.len() > 1);
        assert!(root.courses().is_empty());
        assert!(root.course("2024/test").is_err());
    }
}
