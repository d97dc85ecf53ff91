//! Distribution builds stamped with a selected version

pub mod artifact;
pub mod builder;

pub use artifact::{carries_version, Artifact, ArtifactKind, ArtifactSet};
pub use builder::ArtifactBuilder;
