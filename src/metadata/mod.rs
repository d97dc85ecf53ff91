//! Project metadata read from pyproject.toml and projected with resolved versions

pub mod project;
pub mod projector;
pub mod version_info;

pub use project::ProjectMetadata;
pub use projector::{MetadataProjector, VersionMode, FIELDS};
pub use version_info::VersionInfo;
