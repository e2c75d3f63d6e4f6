//! models
//!
//! Node types of the course content graph.
//!
//! # Modules
//!
//! - [`root`] - The root node: courses, run years, licenses
//! - [`course`] - Courses and lazy lesson loading
//! - [`session`] - Sessions and their front/back pages
//! - [`material`] - Session materials
//! - [`lesson`] - Lessons and static files
//! - [`page`] - Pages, solutions and content link resolution
//! - [`run_year`] - Course runs by year
//! - [`license`] - Content licenses
//! - [`sourced`] - Fields of documents that come from a source file
//!
//! # Routing
//!
//! [`WEB_TEMPLATES`] and [`API_TEMPLATES`] hold the default path templates.
//! Placeholders are primary-key names, so every node that can be addressed
//! has its full key chain available.

pub mod course;
pub mod lesson;
pub mod license;
pub mod material;
pub mod page;
pub mod root;
pub mod run_year;
pub mod session;
pub mod sourced;

use crate::core::registry::Registry;
use crate::core::types::{ModelKind, SchemaView, UrlKind};
use crate::core::urls::UrlTable;

/// Default web page paths.
pub const WEB_TEMPLATES: &[(ModelKind, &str)] = &[
    (ModelKind::Root, "/"),
    (ModelKind::Course, "/course/{course_slug}/"),
    (ModelKind::RunYear, "/runs/{year}/"),
    (ModelKind::Session, "/course/{course_slug}/sessions/{session_slug}/"),
    (
        ModelKind::SessionPage,
        "/course/{course_slug}/sessions/{session_slug}/{page_slug}/",
    ),
    (ModelKind::Lesson, "/course/{course_slug}/{lesson_slug}/"),
    (ModelKind::Page, "/course/{course_slug}/{lesson_slug}/{page_slug}/"),
    (
        ModelKind::Solution,
        "/course/{course_slug}/{lesson_slug}/{page_slug}/solutions/{solution_index}/",
    ),
    (
        ModelKind::StaticFile,
        "/course/{course_slug}/{lesson_slug}/static/{filename}",
    ),
];

/// Default API document paths.
pub const API_TEMPLATES: &[(ModelKind, &str)] = &[
    (ModelKind::Root, "/api/index.json"),
    (ModelKind::Course, "/api/course/{course_slug}.json"),
    (ModelKind::RunYear, "/api/runs/{year}.json"),
];

/// Path of schema documents.
pub const SCHEMA_TEMPLATE: &str = "/api/schema/{view}/{model}.json";

/// Primary-key names available to templates of `kind`.
pub fn key_names(kind: ModelKind) -> &'static [&'static str] {
    match kind {
        ModelKind::Root | ModelKind::Material => &[],
        ModelKind::License => &["license_slug"],
        ModelKind::Course => &["course_slug"],
        ModelKind::RunYear => &["year"],
        ModelKind::Session => &["course_slug", "session_slug"],
        ModelKind::SessionPage => &["course_slug", "session_slug", "page_slug"],
        ModelKind::Lesson => &["course_slug", "lesson_slug"],
        ModelKind::Page => &["course_slug", "lesson_slug", "page_slug"],
        ModelKind::Solution => &["course_slug", "lesson_slug", "page_slug", "solution_index"],
        ModelKind::StaticFile => &["course_slug", "lesson_slug", "filename"],
    }
}

impl Registry {
    /// Registry of every standard node type.
    pub fn standard() -> Self {
        Registry::new()
            .with(root::spec())
            .with(license::spec())
            .with(course::spec())
            .with(run_year::spec())
            .with(session::spec())
            .with(session::page_spec())
            .with(material::spec())
            .with(lesson::spec())
            .with(page::spec())
            .with(page::solution_spec())
            .with(lesson::static_file_spec())
    }
}

/// URL table with the default templates under `base_url`.
pub fn standard_urls(base_url: &str) -> UrlTable {
    url_table(
        base_url,
        WEB_TEMPLATES.iter().copied(),
        API_TEMPLATES.iter().copied(),
    )
}

/// URL table from web and API templates, plus schema URLs.
pub fn url_table<'a>(
    base_url: &str,
    web: impl IntoIterator<Item = (ModelKind, &'a str)>,
    api: impl IntoIterator<Item = (ModelKind, &'a str)>,
) -> UrlTable {
    let templates = web
        .into_iter()
        .map(|(model, t)| (UrlKind::Web, model, t))
        .chain(api.into_iter().map(|(model, t)| (UrlKind::Api, model, t)));
    let base = base_url.trim_end_matches('/').to_string();
    UrlTable::from_templates(base_url, templates).with_schema_urls(
        move |model: ModelKind, view: SchemaView, external: bool| {
            let path = SCHEMA_TEMPLATE
                .replace("{view}", view.as_str())
                .replace("{model}", model.name());
            if external {
                format!("{base}{path}")
            } else {
                path
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::urls::template_placeholders;

    #[test]
    fn standard_registry_knows_every_model() {
        let registry = Registry::standard();
        assert_eq!(registry.kinds().collect::<Vec<_>>(), ModelKind::ALL.to_vec());
    }

    #[test]
    fn key_names_match_registered_keys() {
        let registry = Registry::standard();
        for kind in ModelKind::ALL {
            let own = registry.spec(kind).unwrap().key_name();
            assert_eq!(key_names(kind).last().copied(), own, "{kind}");
        }
    }

    #[test]
    fn default_templates_use_known_keys() {
        for (kind, template) in WEB_TEMPLATES.iter().chain(API_TEMPLATES) {
            for name in template_placeholders(template) {
                assert!(key_names(*kind).contains(&name), "{kind}: {name}");
            }
        }
    }

    #[test]
    fn schema_urls_are_absolute_when_external() {
        let urls = standard_urls("https://example.test/");
        assert_eq!(
            urls.schema_url(ModelKind::Course, SchemaView::Output, true).as_deref(),
            Some("https://example.test/api/schema/output/Course.json")
        );
        assert_eq!(
            urls.schema_url(ModelKind::Page, SchemaView::Input, false).as_deref(),
            Some("/api/schema/input/Page.json")
        );
    }
}
