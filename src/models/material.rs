//! models::material
//!
//! Teaching materials listed in a session: either a lesson of the course or
//! a link to an external resource.

use crate::core::convert::Converter;
use crate::core::error::ModelError;
use crate::core::field::Field;
use crate::core::graph::Root;
use crate::core::lazy::LessonHandle;
use crate::core::node::Attr;
use crate::core::registry::{ModelBuilder, ModelSpec, UrlStrategy};
use crate::core::types::{ModelKind, NodeId, UrlKind};
use crate::core::urls::UrlError;

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::Material)
        .doc("Teaching material, usually a link to a lesson or external page")
        .inherits(&[Attr::Course, Attr::Session])
        .url(UrlStrategy::Custom(material_url))
        .field(Field::new("slug", Converter::Str).optional())
        .field(
            Field::new("title", Converter::Str)
                .optional()
                .doc("Human-readable title"),
        )
        .field(
            Field::new("external_url", Converter::Url)
                .optional()
                .doc("URL for a link to content that's not a lesson"),
        )
        .field(
            Field::new("lesson_slug", Converter::Str)
                .optional()
                .doc("Slug of the corresponding lesson")
                .after_load(check_target),
        )
        .field(
            Field::new("type", Converter::Str)
                .doc("Type of the material (e.g. lesson, homework, cheatsheet, link, special). Used for the icon in material lists."),
        )
        .build()
}

fn check_target(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    let node = root.node(id);
    if node.has("external_url") && node.has("lesson_slug") {
        return Err(ModelError::Conversion {
            model: ModelKind::Material,
            path: "lesson_slug".to_string(),
            message: "external_url and lesson_slug are incompatible".to_string(),
        });
    }
    Ok(())
}

/// Web URL of the referenced lesson or the external link.
fn material_url(root: &Root, id: NodeId, kind: UrlKind, external: bool) -> Result<String, ModelError> {
    if kind != UrlKind::Web {
        return Err(UrlError::NoUrlType(kind).into());
    }
    let node = root.node(id);
    if let Some(lesson) = node.str("lesson_slug") {
        let mut pks = node.lineage().course.map(|c| root.pks(c)).unwrap_or_default();
        pks.insert("lesson_slug", lesson.to_string());
        return root.url_for_pks(UrlKind::Web, ModelKind::Lesson, &pks, external);
    }
    match node.str("external_url") {
        Some(url) => Ok(url.to_string()),
        None => Err(UrlError::NoUrl(ModelKind::Material).into()),
    }
}

impl Root {
    /// Lesson a material points to.
    ///
    /// Returns `None` for external links and for lessons that are only
    /// queued so far.
    pub fn material_lesson(&mut self, material: NodeId) -> Result<Option<NodeId>, ModelError> {
        let node = self.node(material);
        let (Some(course), Some(slug)) = (node.lineage().course, node.str("lesson_slug")) else {
            return Ok(None);
        };
        let slug = slug.to_string();
        match self.request_lesson(course, &slug)? {
            LessonHandle::Loaded(id) => Ok(Some(id)),
            LessonHandle::Requested => Ok(None),
        }
    }
}
