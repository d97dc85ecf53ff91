//! Version resolution from tags and unreleased conventional commits

pub mod version_resolver;

pub use version_resolver::{decide_bump, BumpPolicy, NearestTag, VersionResolver};
