use crate::domain::{Version, VersionSelection};
use crate::error::{RelcraftError, Result};
use crate::git::Repository;
use crate::metadata::{ProjectMetadata, VersionInfo};
use crate::resolver::{BumpPolicy, VersionResolver};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Field names accepted by [`MetadataProjector::field`]
pub const FIELDS: [&str; 3] = ["name", "version", "description"];

/// Which resolver output feeds the `version` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionMode {
    #[default]
    Current,
    Next,
}

impl FromStr for VersionMode {
    type Err = RelcraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "current" => Ok(VersionMode::Current),
            "next" => Ok(VersionMode::Next),
            other => Err(RelcraftError::config(format!(
                "Unknown version mode '{}' (expected current or next)",
                other
            ))),
        }
    }
}

impl fmt::Display for VersionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionMode::Current => write!(f, "current"),
            VersionMode::Next => write!(f, "next"),
        }
    }
}

/// Exposes project metadata with the version supplied by the resolver
pub struct MetadataProjector<'r, 'a, R: Repository> {
    metadata: &'r ProjectMetadata,
    resolver: &'r VersionResolver<'a, R>,
    policy: BumpPolicy,
}

impl<'r, 'a, R: Repository> MetadataProjector<'r, 'a, R> {
    pub fn new(metadata: &'r ProjectMetadata, resolver: &'r VersionResolver<'a, R>) -> Self {
        MetadataProjector {
            metadata,
            resolver,
            policy: BumpPolicy::Conventional,
        }
    }

    pub fn with_policy(mut self, policy: BumpPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn version(&self, mode: VersionMode) -> Result<Version> {
        match mode {
            VersionMode::Current => self.resolver.current(),
            VersionMode::Next => self.resolver.next(self.policy),
        }
    }

    /// A single field as text
    pub fn field(&self, name: &str, mode: VersionMode) -> Result<String> {
        match name {
            "name" => Ok(self.metadata.name.clone()),
            "description" => Ok(self.metadata.description.clone()),
            "version" => Ok(self.version(mode)?.to_string()),
            other => Err(RelcraftError::UnknownField(other.to_string())),
        }
    }

    /// Every field, in display order
    pub fn summary(&self, mode: VersionMode) -> Result<Vec<(&'static str, String)>> {
        FIELDS
            .iter()
            .map(|name| Ok((*name, self.field(name, mode)?)))
            .collect()
    }

    /// Persist the version metadata file for an explicit selection
    pub fn write_version_info(
        &self,
        path: &Path,
        selection: &VersionSelection,
    ) -> Result<VersionInfo> {
        let info = VersionInfo::new(self.metadata, selection.version());
        info.write(path)?;
        Ok(info)
    }
}
