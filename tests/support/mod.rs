//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value as Json};

use syllabus::core::graph::Root;
use syllabus::models::standard_urls;
use syllabus::render::MockRenderer;

pub const BASE_URL: &str = "https://example.test";
pub const LICENSE: &str = "cc-by-sa-40";

/// Renderer with the standard license registered.
pub fn renderer() -> MockRenderer {
    MockRenderer::new().with_license(
        LICENSE,
        json!({
            "title": "Creative Commons Attribution-ShareAlike 4.0 International",
            "url": "https://creativecommons.org/licenses/by-sa/4.0/",
        }),
    )
}

/// Root with standard URLs and licenses loaded.
pub fn root(renderer: MockRenderer) -> Root {
    let mut root = Root::standard(standard_urls(BASE_URL), Box::new(renderer));
    root.load_licenses().expect("licenses load");
    root
}

/// Raw lesson with a single `index` page holding `content`.
pub fn lesson(title: &str, content: &str) -> Json {
    json!({
        "pages": {
            "index": {
                "title": title,
                "content": content,
                "attribution": ["For PyLadies CZ"],
                "license": LICENSE,
            },
        },
    })
}

/// HTML linking to the index page of `lesson`.
pub fn link_to(lesson: &str) -> String {
    format!("<p>Next: <a href=\"naucse:page?lesson={lesson}\">{lesson}</a></p>")
}

/// Raw course whose single session lists `lessons` as materials.
pub fn course(title: &str, date: &str, lessons: &[&str]) -> Json {
    let materials: Vec<Json> = lessons
        .iter()
        .map(|slug| json!({"type": "lesson", "lesson_slug": slug}))
        .collect();
    json!({
        "title": title,
        "default_time": {"start": "09:00", "end": "12:00"},
        "sessions": [
            {"slug": "intro", "title": "Introduction", "date": date, "materials": materials},
        ],
    })
}
