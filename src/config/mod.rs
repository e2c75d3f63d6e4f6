//! config
//!
//! Configuration loading.
//!
//! # Locations
//!
//! The first existing file wins:
//! 1. The path given with `--config` (must exist)
//! 2. `$SYLLABUS_CONFIG` if set
//! 3. `./syllabus.toml`
//! 4. `$XDG_CONFIG_HOME/syllabus/config.toml`
//! 5. `~/.syllabus/config.toml`
//!
//! No file at all means defaults.
//!
//! # Example
//!
//! ```no_run
//! use syllabus::config::Config;
//!
//! let result = Config::load(None).unwrap();
//! let config = result.config;
//! println!("Serving from {}", config.base_url());
//! let urls = config.url_table();
//! ```

pub mod schema;

pub use schema::{FileConfig, RepoConfig, UrlsConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{ApiVersion, ModelKind};
use crate::core::urls::UrlTable;
use crate::models::{self, sourced::RepoInfo};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "SYLLABUS_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub file: FileConfig,
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `explicit` or the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is missing, or if a config file exists
    /// but cannot be read, parsed or validated.
    pub fn load(explicit: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            return Ok(ConfigLoadResult { config, warnings });
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                let config = Self::from_file(&path)?;
                return Ok(ConfigLoadResult { config, warnings });
            }
            warnings.push(ConfigWarning {
                message: format!("${CONFIG_ENV} points to a missing file, ignoring it"),
                path,
            });
        }

        for path in Self::search_paths() {
            if path.exists() {
                let config = Self::from_file(&path)?;
                return Ok(ConfigLoadResult { config, warnings });
            }
        }

        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    /// Read, parse and validate one config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("syllabus.toml")];
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg_home).join("syllabus/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".syllabus/config.toml"));
        }
        paths
    }

    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Absolute base of external URLs.
    ///
    /// Defaults to [`DEFAULT_BASE_URL`].
    pub fn base_url(&self) -> &str {
        self.file.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Directory with pre-rendered content.
    ///
    /// Relative paths are resolved against the config file's directory.
    pub fn content_dir(&self) -> PathBuf {
        let dir = self
            .file
            .content_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        match self.path.as_deref().and_then(Path::parent) {
            Some(base) if dir.is_relative() && !base.as_os_str().is_empty() => base.join(dir),
            _ => dir,
        }
    }

    pub fn api_version(&self) -> ApiVersion {
        self.file.api_version.unwrap_or_default()
    }

    pub fn repo_info(&self) -> Option<RepoInfo> {
        let repo = self.file.repo.as_ref()?;
        let url = repo.url.clone()?;
        Some(RepoInfo::new(url, repo.branch.as_deref().unwrap_or("main")))
    }

    /// URL table with the default templates and configured overrides.
    pub fn url_table(&self) -> UrlTable {
        let urls = self.file.urls.clone().unwrap_or_default();
        let web = merge(models::WEB_TEMPLATES, &urls.web);
        let api = merge(models::API_TEMPLATES, &urls.api);
        models::url_table(
            self.base_url(),
            web.iter().map(|(k, t)| (*k, t.as_str())),
            api.iter().map(|(k, t)| (*k, t.as_str())),
        )
    }
}

fn merge(
    defaults: &[(ModelKind, &str)],
    overrides: &std::collections::BTreeMap<String, String>,
) -> Vec<(ModelKind, String)> {
    let mut merged: Vec<(ModelKind, String)> = defaults
        .iter()
        .map(|(kind, template)| (*kind, template.to_string()))
        .collect();
    for (name, template) in overrides {
        let Ok(kind) = name.parse::<ModelKind>() else {
            continue;
        };
        match merged.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = template.clone(),
            None => merged.push((kind, template.clone())),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Pks, UrlKind};
    use tempfile::TempDir;

    fn write(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("syllabus.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_without_a_file() {
        let config = Config::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.content_dir(), PathBuf::from("."));
        assert_eq!(config.api_version(), ApiVersion::CURRENT);
        assert!(config.repo_info().is_none());
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            r#"
            base_url = "https://naucse.python.cz"
            content_dir = "rendered"

            [repo]
            url = "https://github.com/pyvec/naucse"
            "#,
        );
        let result = Config::load(Some(&path)).unwrap();
        let config = result.config;
        assert_eq!(config.base_url(), "https://naucse.python.cz");
        assert_eq!(config.content_dir(), temp.path().join("rendered"));
        assert_eq!(config.repo_info().unwrap().branch, "main");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = Config::load(Some(&temp.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn invalid_values_fail_loading() {
        let temp = TempDir::new().unwrap();
        let path = write(&temp, "base_url = \"naucse\"\n");
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::InvalidValue(_))
        ));
        let path = write(&temp, "base_url = [1]\n");
        assert!(matches!(Config::from_file(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn overrides_replace_default_templates() {
        let temp = TempDir::new().unwrap();
        let path = write(
            &temp,
            r#"
            base_url = "https://example.test"

            [urls.web]
            Course = "/kurz/{course_slug}/"
            "#,
        );
        let urls = Config::from_file(&path).unwrap().url_table();
        let mut pks = Pks::new();
        pks.insert("course_slug", "mi-pyt".to_string());
        assert_eq!(
            urls.url_for(UrlKind::Web, ModelKind::Course, &pks, true).unwrap(),
            "https://example.test/kurz/mi-pyt/"
        );
        assert_eq!(
            urls.url_for(UrlKind::Api, ModelKind::Course, &pks, false).unwrap(),
            "/api/course/mi-pyt.json"
        );
    }
}
