//! config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! base_url = "https://naucse.python.cz"
//! content_dir = "rendered"
//! api_version = [0, 4]
//!
//! [repo]
//! url = "https://github.com/pyvec/naucse"
//! branch = "main"
//!
//! [urls.web]
//! Course = "/kurz/{course_slug}/"
//!
//! [urls.api]
//! Course = "/api/kurz/{course_slug}.json"
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: the base URL must be absolute, URL
//! tables may only name known models, and templates may only use the
//! primary keys available to their model.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{ApiVersion, ModelKind};
use crate::models;

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Absolute base of external URLs
    pub base_url: Option<String>,

    /// Directory holding pre-rendered content
    pub content_dir: Option<PathBuf>,

    /// Version reported in served data
    pub api_version: Option<ApiVersion>,

    /// Repository used for edit links
    pub repo: Option<RepoConfig>,

    /// URL template overrides
    pub urls: Option<UrlsConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.base_url {
            let parsed = url::Url::parse(base).map_err(|e| {
                ConfigError::InvalidValue(format!("base_url '{base}' is not an absolute URL: {e}"))
            })?;
            if parsed.cannot_be_a_base() {
                return Err(ConfigError::InvalidValue(format!(
                    "base_url '{base}' cannot be used as a base"
                )));
            }
        }
        if let Some(repo) = &self.repo {
            repo.validate()?;
        }
        if let Some(urls) = &self.urls {
            urls.validate()?;
        }
        Ok(())
    }
}

/// Repository settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Web URL of the repository
    pub url: Option<String>,

    /// Branch edit links point to (default: "main")
    pub branch: Option<String>,
}

impl RepoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.url {
            Some(url) if url::Url::parse(url).is_err() => Err(ConfigError::InvalidValue(
                format!("repo url '{url}' is not an absolute URL"),
            )),
            None => Err(ConfigError::InvalidValue(
                "repo url is required when [repo] is present".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }
}

/// URL template overrides, by model name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UrlsConfig {
    pub web: BTreeMap<String, String>,
    pub api: BTreeMap<String, String>,
}

impl UrlsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (model, template) in self.web.iter().chain(&self.api) {
            let kind: ModelKind = model
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("in [urls]: {e}")))?;
            let known = models::key_names(kind);
            for name in crate::core::urls::template_placeholders(template) {
                if !known.contains(&name) {
                    return Err(ConfigError::InvalidValue(format!(
                        "template for {kind} uses unknown key '{{{name}}}' (available: {})",
                        known.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            base_url = "https://naucse.python.cz"
            api_version = [0, 5]

            [repo]
            url = "https://github.com/pyvec/naucse"

            [urls.web]
            Course = "/kurz/{course_slug}/"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_version, Some(ApiVersion::new(0, 5)));
        assert_eq!(config.urls.as_ref().unwrap().web["Course"], "/kurz/{course_slug}/");
        config.validate().unwrap();
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<FileConfig, _> = toml::from_str("colour = \"red\"");
        assert!(result.is_err());
    }

    #[test]
    fn relative_base_url_is_invalid() {
        let config = FileConfig {
            base_url: Some("/naucse".into()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn templates_are_checked_against_model_keys() {
        let mut urls = UrlsConfig::default();
        urls.web.insert("Course".into(), "/c/{lesson_slug}/".into());
        let err = urls.validate().unwrap_err();
        assert!(err.to_string().contains("unknown key '{lesson_slug}'"), "{err}");

        let mut urls = UrlsConfig::default();
        urls.api.insert("Spaceship".into(), "/s/".into());
        assert!(urls.validate().unwrap_err().to_string().contains("unknown model 'Spaceship'"));
    }

    #[test]
    fn repo_needs_a_url() {
        assert!(RepoConfig::default().validate().is_err());
        let repo = RepoConfig {
            url: Some("https://github.com/pyvec/naucse".into()),
            branch: None,
        };
        repo.validate().unwrap();
    }
}
