//! models::sourced
//!
//! Fields shared by documents that come from a source file in a content
//! repository, and the edit links derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as Json};
use tracing::debug;
use url::Url;

use crate::core::convert::Converter;
use crate::core::error::ModelError;
use crate::core::field::Field;
use crate::core::graph::Root;
use crate::core::types::NodeId;
use crate::core::value::Value;

/// Repository where content can be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// Web URL of the repository, e.g. `https://github.com/pyvec/naucse`
    pub url: String,
    pub branch: String,
}

impl RepoInfo {
    pub fn new(url: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
        }
    }

    /// Human-readable name of the hosting service.
    pub fn page_name(&self) -> String {
        let host = Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        match host.as_deref() {
            Some("github.com") => "GitHub".to_string(),
            Some("gitlab.com") => "GitLab".to_string(),
            Some(other) => other.to_string(),
            None => "repository".to_string(),
        }
    }

    /// Edit link information for a file, relative to the repository root.
    pub fn edit_info(&self, path: &str) -> Json {
        let base = self.url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        json!({
            "url": format!("{base}/blob/{}/{path}", self.branch),
            "page_name": self.page_name(),
        })
    }
}

/// Base fields of sourced documents.
pub fn fields() -> Vec<Field> {
    vec![
        Field::new("source_file", Converter::Str)
            .optional()
            .doc("Path to the source file of the content, relative to the repository root")
            .after_load(set_edit_info),
        Field::new("edit_info", Converter::Any)
            .optional()
            .output_only()
            .doc("Information about the repository where this content can be edited"),
    ]
}

fn set_edit_info(root: &mut Root, id: NodeId) -> Result<(), ModelError> {
    let Some(path) = root.node(id).str("source_file") else {
        return Ok(());
    };
    match root.repo_info() {
        Some(repo) => {
            let info = repo.edit_info(path);
            root.set_field(id, "edit_info", Value::Json(info));
        }
        None => debug!(node = %id, "no repository info, skipping edit link"),
    }
    Ok(())
}
