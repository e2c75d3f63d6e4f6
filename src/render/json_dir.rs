//! render::json_dir
//!
//! Renderer backed by a directory of pre-rendered JSON documents.
//!
//! # Layout
//!
//! ```text
//! <dir>/courses/<course slug>.json
//! <dir>/lessons/<lesson slug>.json
//! <dir>/extras/<material slug>.json
//! <dir>/licenses/<license slug>.json
//! ```
//!
//! Slugs may contain `/`, which maps to subdirectories
//! (`courses/2024/pyladies` is read from `courses/2024/pyladies.json`).
//! Slugs with `..`, `.` or root components are rejected.

use std::fs;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value as Json;
use tracing::debug;

use super::{RenderError, Renderer};

/// Reads content from a directory tree of JSON files.
#[derive(Debug, Clone)]
pub struct JsonDirRenderer {
    root: PathBuf,
}

impl JsonDirRenderer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document(&self, section: &str, slug: &str) -> Result<PathBuf, RenderError> {
        let plain = !slug.is_empty()
            && Path::new(slug)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(RenderError::InvalidSlug(slug.to_string()));
        }
        Ok(self.root.join(section).join(format!("{slug}.json")))
    }

    fn read(&self, path: &Path) -> Result<Option<Json>, RenderError> {
        if !path.is_file() {
            return Ok(None);
        }
        debug!(path = %path.display(), "reading rendered content");
        let text = fs::read_to_string(path).map_err(|e| RenderError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| RenderError::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

impl Renderer for JsonDirRenderer {
    fn name(&self) -> &'static str {
        "json-dir"
    }

    fn course(&self, slug: &str) -> Result<Json, RenderError> {
        self.read(&self.document("courses", slug)?)?
            .ok_or_else(|| RenderError::CourseNotFound(slug.to_string()))
    }

    fn lessons(&self, slugs: &[String], _vars: &Json) -> Result<IndexMap<String, Json>, RenderError> {
        let mut out = IndexMap::with_capacity(slugs.len());
        for slug in slugs {
            let data = self
                .read(&self.document("lessons", slug)?)?
                .ok_or_else(|| RenderError::LessonNotFound(slug.clone()))?;
            out.insert(slug.clone(), data);
        }
        Ok(out)
    }

    fn extra_lesson(&self, course: &str, slug: &str, _vars: &Json) -> Result<Json, RenderError> {
        self.read(&self.document("extras", slug)?)?
            .ok_or_else(|| RenderError::MaterialNotFound {
                course: course.to_string(),
                slug: slug.to_string(),
            })
    }

    fn licenses(&self) -> Result<IndexMap<String, Json>, RenderError> {
        let dir = self.root.join("licenses");
        let mut out = IndexMap::new();
        if !dir.is_dir() {
            return Ok(out);
        }
        let io_error = |e: std::io::Error| RenderError::Io {
            path: dir.clone(),
            message: e.to_string(),
        };
        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)
            .map_err(io_error)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_error)?;
        paths.sort();
        for path in paths {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(data) = self.read(&path)? {
                out.insert(slug.to_string(), data);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, data: &Json) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(data).unwrap()).unwrap();
    }

    #[test]
    fn reads_nested_slugs() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "courses/2024/pyladies.json", &json!({"title": "PyLadies"}));
        let renderer = JsonDirRenderer::new(tmp.path());
        assert_eq!(renderer.course("2024/pyladies").unwrap()["title"], "PyLadies");
        assert_eq!(
            renderer.course("2024/nope"),
            Err(RenderError::CourseNotFound("2024/nope".into()))
        );
    }

    #[test]
    fn lessons_fail_on_first_missing_slug() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "lessons/beginners/install.json", &json!({"pages": {}}));
        let renderer = JsonDirRenderer::new(tmp.path());
        let got = renderer
            .lessons(&["beginners/install".into()], &json!({}))
            .unwrap();
        assert!(got.contains_key("beginners/install"));
        assert_eq!(
            renderer.lessons(&["beginners/nope".into()], &json!({})),
            Err(RenderError::LessonNotFound("beginners/nope".into()))
        );
    }

    #[test]
    fn licenses_are_keyed_by_file_stem() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "licenses/cc0.json", &json!({"title": "CC0"}));
        write(tmp.path(), "licenses/cc-by-sa-40.json", &json!({"title": "CC BY-SA"}));
        fs::write(tmp.path().join("licenses/README"), "not a license").unwrap();
        let licenses = JsonDirRenderer::new(tmp.path()).licenses().unwrap();
        assert_eq!(licenses.keys().collect::<Vec<_>>(), vec!["cc-by-sa-40", "cc0"]);
    }

    #[test]
    fn slugs_cannot_leave_the_content_tree() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "secret.json", &json!({"title": "Secret"}));
        write(tmp.path(), "courses/ok.json", &json!({"title": "Ok"}));
        let renderer = JsonDirRenderer::new(tmp.path().join("content"));
        for slug in ["../secret", "../../secret", "/etc/passwd", "a/../../secret", "./ok", ""] {
            assert_eq!(
                renderer.course(slug),
                Err(RenderError::InvalidSlug(slug.to_string())),
                "{slug}"
            );
        }
        let renderer = JsonDirRenderer::new(tmp.path());
        assert!(renderer.course("ok").is_ok());
        assert!(matches!(
            renderer.lessons(&["../courses/ok".into()], &json!({})),
            Err(RenderError::InvalidSlug(_))
        ));
        assert!(matches!(
            renderer.extra_lesson("ok", "../courses/ok", &json!({})),
            Err(RenderError::InvalidSlug(_))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("courses")).unwrap();
        fs::write(tmp.path().join("courses/bad.json"), "{").unwrap();
        let err = JsonDirRenderer::new(tmp.path()).course("bad").unwrap_err();
        assert!(matches!(err, RenderError::Malformed { .. }));
    }
}
