use crate::domain::Version;
use crate::error::{RelcraftError, Result};
use std::fs;
use std::path::Path;
use toml::Value;

/// The `[project]` table of a pyproject.toml
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectMetadata {
    pub name: String,
    pub description: String,
    /// Statically declared version; `None` when the version is derived from tags
    pub version: Option<String>,
}

impl ProjectMetadata {
    /// Load metadata from a pyproject.toml file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            RelcraftError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text).map_err(|e| match e {
            RelcraftError::Config(msg) => {
                RelcraftError::config(format!("{} in {}", msg, path.display()))
            }
            other => other,
        })
    }

    /// Parse metadata from pyproject.toml text
    pub fn parse(text: &str) -> Result<Self> {
        let document: Value = toml::from_str(text)?;
        let project = document
            .get("project")
            .and_then(Value::as_table)
            .ok_or_else(|| RelcraftError::config("Missing [project] table"))?;

        let text_field = |key: &str| -> String {
            project
                .get(key)
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let is_dynamic = project
            .get("dynamic")
            .and_then(Value::as_array)
            .map(|items| items.iter().any(|v| v.as_str() == Some("version")))
            .unwrap_or(false);

        let version = if is_dynamic {
            None
        } else {
            Some(text_field("version")).filter(|v| !v.is_empty())
        };

        Ok(ProjectMetadata {
            name: text_field("name"),
            description: text_field("description"),
            version,
        })
    }

    /// Whether the version comes from source-control tags rather than the file
    pub fn is_tag_derived(&self) -> bool {
        self.version.is_none()
    }

    /// The static version parsed, if one is declared
    pub fn static_version(&self) -> Result<Option<Version>> {
        self.version.as_deref().map(Version::parse).transpose()
    }
}
