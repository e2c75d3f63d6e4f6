//! models::page
//!
//! Pages of teaching text, their solutions, and resolution of the content
//! links embedded in them.
//!
//! # Links
//!
//! Page and solution HTML may link to other content with `naucse:` pseudo
//! URLs. While the page loads they are rewritten to site-relative URLs:
//!
//! - a page of a loaded lesson must exist
//! - a page of a lesson that is not loaded queues the lesson on the course;
//!   once the course is frozen this is an error
//! - a solution link points at a solution of the page being loaded; in page
//!   content the solution must exist
//! - a static link must name a static file already loaded on the lesson

use crate::core::content::ContentLink;
use crate::core::convert::{Converter, LinkResolver, LoadCx};
use crate::core::error::ModelError;
use crate::core::field::{empty_list, empty_map, position, Field};
use crate::core::graph::Root;
use crate::core::lazy::LessonHandle;
use crate::core::node::Attr;
use crate::core::registry::{KeySource, ModelBuilder, ModelSpec};
use crate::core::types::{ModelKind, NodeId, UrlKind};

use super::lesson::construct_key;
use super::sourced;

/// Rewrites content links of pages and solutions.
pub const PAGE_LINKS: LinkResolver = LinkResolver(resolve_link);

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::Page)
        .doc("One page of teaching text")
        .key("page_slug", KeySource::Construct)
        .inherits(&[Attr::Course, Attr::Lesson])
        .extends(sourced::fields())
        .field(Field::new("slug", Converter::Str).factory(construct_key))
        .field(Field::new("title", Converter::Str).doc("Human-readable title"))
        .field(
            Field::new("solutions", Converter::list(Converter::Model(ModelKind::Solution)))
                .factory(empty_list)
                .doc("Solutions to problems that appear on the page"),
        )
        .field(Field::new("content", Converter::Html(Some(PAGE_LINKS))).doc("Content, as HTML"))
        .field(
            Field::new("modules", Converter::dict(Converter::Str))
                .factory(empty_map)
                .doc("Additional modules as a dict with `slug` key and version values"),
        )
        .field(
            Field::new("attribution", Converter::list(Converter::Html(None)))
                .doc("Lines of attribution, as HTML fragments"),
        )
        .field(Field::new("license", Converter::License).doc("License slugs. Only approved licenses are allowed."))
        .field(
            Field::new("license_code", Converter::License)
                .optional()
                .doc("Slug of licence for code snippets."),
        )
        .field(Field::new("css", Converter::Css).optional().doc("CSS specific to this page."))
        .build()
}

pub fn solution_spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::Solution)
        .doc("Solution to a problem on a page")
        .key("solution_index", KeySource::Field("index"))
        .inherits(&[Attr::Course, Attr::Lesson, Attr::Page])
        .field(
            Field::new("index", Converter::Int)
                .factory(position)
                .doc("Number of the solution"),
        )
        .field(Field::new("content", Converter::Html(Some(PAGE_LINKS))).doc("Content, as HTML"))
        .build()
}

fn resolve_link(cx: &mut LoadCx<'_>, link: &ContentLink) -> Result<String, ModelError> {
    let unresolved = |reason: String| ModelError::ContentReference {
        identifier: link.to_string(),
        reason,
    };
    let lineage = *cx.root.node(cx.instance).lineage();
    match link {
        ContentLink::Page { lesson, page } => {
            let course = lineage
                .course
                .ok_or_else(|| unresolved("not inside a course".to_string()))?;
            let handle = cx
                .root
                .request_lesson(course, lesson)
                .map_err(|e| unresolved(e.to_string()))?;
            if let LessonHandle::Loaded(loaded) = handle {
                if cx.root.node(loaded).child("pages", page).is_none() {
                    return Err(unresolved(format!("lesson {lesson} has no page {page}")));
                }
            }
            let mut pks = cx.root.pks(course);
            pks.insert("lesson_slug", lesson.clone());
            pks.insert("page_slug", page.clone());
            cx.root.url_for_pks(UrlKind::Web, ModelKind::Page, &pks, false)
        }
        ContentLink::Solution { index } => {
            let page = lineage
                .page
                .ok_or_else(|| unresolved("not inside a page".to_string()))?;
            // Solutions load before page content; solution content sees no list yet.
            let page_node = cx.root.node(page);
            if page_node.has("solutions") {
                let count = page_node.children("solutions").len();
                if *index >= count {
                    return Err(unresolved(format!("page has {count} solutions")));
                }
            }
            let mut pks = cx.root.pks(page);
            pks.insert("solution_index", index.to_string());
            cx.root.url_for_pks(UrlKind::Web, ModelKind::Solution, &pks, false)
        }
        ContentLink::Static { filename } => {
            let lesson = lineage
                .lesson
                .ok_or_else(|| unresolved("not inside a lesson".to_string()))?;
            let file = cx
                .root
                .static_file(lesson, filename)
                .ok_or_else(|| unresolved(format!("no static file {filename}")))?;
            cx.root.url(file, UrlKind::Web, false)
        }
    }
}

impl Root {
    /// Session material that presents the page's lesson.
    pub fn page_material(&self, page: NodeId) -> Option<NodeId> {
        let lineage = self.node(page).lineage();
        let (course, lesson) = (lineage.course?, lineage.lesson?);
        let slug = self.node(lesson).key()?;
        self.node(course)
            .children("sessions")
            .into_iter()
            .flat_map(|session| self.node(session).children("materials"))
            .find(|material| self.node(*material).str("lesson_slug") == Some(slug))
    }
}
