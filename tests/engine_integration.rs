//! Integration tests for loading, freezing and dumping whole courses.

mod support;

use serde_json::json;

use syllabus::core::error::ModelError;
use syllabus::core::graph::DumpOptions;
use syllabus::core::lazy::MAX_LINK_DEPTH;
use syllabus::core::types::{ModelKind, NodeId, SchemaView, UrlKind};
use syllabus::render::mock::MockCall;
use syllabus::render::MockRenderer;

use support::{course, lesson, link_to, renderer, root, BASE_URL};

// =============================================================================
// End to end
// =============================================================================

#[test]
fn course_loads_freezes_and_dumps() {
    let renderer = renderer()
        .with_course("2024/pyladies", course("PyLadies", "2024-01-10", &["beginners/install"]))
        .with_lesson("beginners/install", lesson("Install Python", &link_to("beginners/cmdline")))
        .with_lesson("beginners/cmdline", lesson("Command line", "<p>cd</p>"));
    let handle = renderer.clone();
    let mut root = root(renderer);

    let course = root.load_course("2024/pyladies", false).unwrap();
    root.freeze_course(course).unwrap();
    assert_eq!(handle.lesson_rounds(), 2);
    assert_eq!(root.lessons(course).len(), 2);

    let data = root.dump(course, DumpOptions::output()).unwrap();
    let session = &data["sessions"][0];
    assert_eq!(session["start_time"], json!("2024-01-10 09:00:00"));
    assert_eq!(session["end_time"], json!("2024-01-10 12:00:00"));
    assert_eq!(data["start_date"], json!("2024-01-10"));
    assert_eq!(data["api_version"], json!([0, 4]));
    assert_eq!(
        data["$schema"],
        json!(format!("{BASE_URL}/api/schema/output/Course.json"))
    );
    assert_eq!(
        session["materials"][0]["url"],
        json!(format!("{BASE_URL}/course/2024/pyladies/beginners/install/"))
    );
    assert_eq!(
        session["pages"]["front"]["url"],
        json!(format!("{BASE_URL}/course/2024/pyladies/sessions/intro/front/"))
    );

    let install = root.loaded_lesson(course, "beginners/install").unwrap();
    let page = root.page(install, "index").unwrap();
    assert_eq!(
        root.node(page).str("content"),
        Some("<p>Next: <a href=\"/course/2024/pyladies/beginners/cmdline/index/\">beginners/cmdline</a></p>")
    );
    let material = root.page_material(page).unwrap();
    assert_eq!(root.material_lesson(material).unwrap(), Some(install));
}

#[test]
fn lessons_render_with_course_vars() {
    let mut data = course("PyLadies", "2024-01-10", &["beginners/install"]);
    data["vars"] = json!({"pyladies": true});
    let renderer = renderer()
        .with_course("2024/pyladies", data)
        .with_lesson("beginners/install", lesson("Install Python", "<p>hi</p>"));
    let mut root = root(renderer);
    let course = root.load_course("2024/pyladies", false).unwrap();
    root.freeze_course(course).unwrap();
    let dumped = root.dump(course, DumpOptions::output()).unwrap();
    assert_eq!(dumped["vars"], json!({"pyladies": true}));
}

#[test]
fn missing_lesson_fails_the_freeze() {
    let renderer = renderer().with_course("2024/pyladies", course("PyLadies", "2024-01-10", &["nope/nope"]));
    let mut root = root(renderer);
    let course = root.load_course("2024/pyladies", false).unwrap();
    let err = root.freeze_course(course).unwrap_err();
    assert!(matches!(err, ModelError::Render(_)), "{err}");
    assert!(!root.is_frozen(course));
}

// =============================================================================
// Lazy loading limits
// =============================================================================

fn chain(length: usize) -> MockRenderer {
    let mut renderer = renderer().with_course("2024/chain", course("Chain", "2024-01-10", &["chain/0"]));
    for i in 0..length {
        let content = if i + 1 < length {
            link_to(&format!("chain/{}", i + 1))
        } else {
            "<p>end</p>".to_string()
        };
        renderer = renderer.with_lesson(&format!("chain/{i}"), lesson(&format!("Step {i}"), &content));
    }
    renderer
}

#[test]
fn links_up_to_the_round_limit_resolve() {
    let renderer = chain(MAX_LINK_DEPTH);
    let handle = renderer.clone();
    let mut root = root(renderer);
    let course = root.load_course("2024/chain", false).unwrap();
    root.freeze_course(course).unwrap();
    assert_eq!(handle.lesson_rounds(), MAX_LINK_DEPTH);
    assert_eq!(root.lessons(course).len(), MAX_LINK_DEPTH);
}

#[test]
fn links_past_the_round_limit_fail() {
    let mut root = root(chain(MAX_LINK_DEPTH + 1));
    let course = root.load_course("2024/chain", false).unwrap();
    let err = root.freeze_course(course).unwrap_err();
    match err {
        ModelError::LinkDepthExceeded { course } => assert_eq!(course, "2024/chain"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn link_cycles_terminate() {
    let renderer = renderer()
        .with_course("2024/cycle", course("Cycle", "2024-01-10", &["a/a"]))
        .with_lesson("a/a", lesson("A", &link_to("b/b")))
        .with_lesson("b/b", lesson("B", &link_to("a/a")));
    let handle = renderer.clone();
    let mut root = root(renderer);
    let course = root.load_course("2024/cycle", false).unwrap();
    root.freeze_course(course).unwrap();
    assert_eq!(handle.lesson_rounds(), 2);
    assert_eq!(
        handle.calls().into_iter().filter(|c| matches!(c, MockCall::Lessons(_))).collect::<Vec<_>>(),
        vec![
            MockCall::Lessons(vec!["a/a".into()]),
            MockCall::Lessons(vec!["b/b".into()]),
        ]
    );
}

#[test]
fn frozen_courses_reject_new_lessons() {
    let renderer = renderer()
        .with_course("2024/pyladies", course("PyLadies", "2024-01-10", &[]))
        .with_lesson("beginners/install", lesson("Install", "<p>hi</p>"));
    let mut root = root(renderer);
    let course = root.load_course("2024/pyladies", false).unwrap();
    root.freeze_course(course).unwrap();
    root.freeze_course(course).unwrap();

    let err = root.request_lesson(course, "beginners/install").unwrap_err();
    assert!(matches!(err, ModelError::NotFound { kind: ModelKind::Lesson, .. }));
    assert!(root.course_material(course, "cheatsheet").is_err());
}

// =============================================================================
// Root and abbreviation
// =============================================================================

fn three_courses() -> syllabus::core::graph::Root {
    let renderer = renderer()
        .with_course("courses/pyladies", course("PyLadies", "2020-01-01", &[]))
        .with_course("2023/pyladies", course("PyLadies 2023", "2023-09-12", &[]))
        .with_course("2024/pyladies", course("PyLadies 2024", "2024-02-20", &[]));
    let mut root = root(renderer);
    root.load_course("courses/pyladies", true).unwrap();
    root.load_course("2023/pyladies", false).unwrap();
    root.load_course("2024/pyladies", false).unwrap();
    root.index_run_years().unwrap();
    root.freeze().unwrap();
    root
}

#[test]
fn abbreviated_root_references_courses() {
    let root = three_courses();
    let data = root.dump(NodeId::ROOT, DumpOptions::abbreviated()).unwrap();
    let courses = data["courses"].as_object().unwrap();
    assert_eq!(courses.len(), 3);
    for (slug, value) in courses {
        assert_eq!(
            value,
            &json!({"$ref": format!("{BASE_URL}/api/course/{slug}.json")})
        );
    }
    assert_eq!(
        data["run_years"]["2024"],
        json!({"$ref": format!("{BASE_URL}/api/runs/2024.json")})
    );
    assert_eq!(data["licenses"]["cc-by-sa-40"]["title"].as_str().map(|t| t.starts_with("Creative")), Some(true));
    assert_eq!(data["url"], json!(format!("{BASE_URL}/")));
}

#[test]
fn expanded_root_validates() {
    let root = three_courses();
    let data = root.dump(NodeId::ROOT, DumpOptions::output()).unwrap();
    assert_eq!(data["courses"]["2023/pyladies"]["title"], json!("PyLadies 2023"));
    assert_eq!(data["run_years"]["2023"]["runs"][0]["title"], json!("PyLadies 2023"));
}

#[test]
fn canonical_courses_are_not_runs() {
    let root = three_courses();
    assert!(root.runs_from_year(2020).is_empty());
    assert_eq!(root.runs_from_year(2024).len(), 1);
    let canonical = root.course("courses/pyladies").unwrap();
    assert!(root.is_canonical(canonical));
    assert!(root.course("courses/nope").is_err());
}

#[test]
fn duplicate_courses_are_rejected() {
    let renderer = renderer().with_course("2024/pyladies", course("PyLadies", "2024-01-10", &[]));
    let mut root = root(renderer);
    root.load_course("2024/pyladies", false).unwrap();
    let err = root.load_course("2024/pyladies", false).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateKey { kind: ModelKind::Course, .. }));
    assert_eq!(root.courses().len(), 1);
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn input_dump_loads_back_identically() {
    let renderer = renderer().with_course(
        "2024/pyladies",
        course("PyLadies", "2024-01-10", &["beginners/install"]),
    );
    let mut first = root(renderer);
    let course = first.load_course("2024/pyladies", false).unwrap();
    let dumped = first.dump(course, DumpOptions::input()).unwrap();
    first
        .validate(ModelKind::Course, SchemaView::Input, &dumped)
        .unwrap();
    assert!(dumped.get("url").is_none());
    assert!(dumped.get("start_date").is_none());
    assert_eq!(dumped["sessions"][0]["start_time"], json!("2024-01-10 09:00:00"));

    let mut second = root(support::renderer().with_course("2024/pyladies", dumped.clone()));
    let reloaded = second.load_course("2024/pyladies", false).unwrap();
    assert_eq!(second.dump(reloaded, DumpOptions::input()).unwrap(), dumped);
    assert_eq!(
        second.url(reloaded, UrlKind::Api, true).unwrap(),
        format!("{BASE_URL}/api/course/2024/pyladies.json")
    );
}

#[test]
fn invalid_course_data_names_the_path() {
    let renderer = renderer().with_course(
        "2024/broken",
        json!({"title": "Broken", "sessions": [{"slug": "a", "title": 3}]}),
    );
    let mut root = root(renderer);
    match root.load_course("2024/broken", false).unwrap_err() {
        ModelError::Schema { model, view, errors } => {
            assert_eq!(model, ModelKind::Course);
            assert_eq!(view, SchemaView::Input);
            assert!(errors.iter().any(|e| e.starts_with("/sessions/0/title")), "{errors:?}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
