//! Domain logic - pure release rules independent of git and subprocess work

pub mod commit;
pub mod prerelease;
pub mod selection;
pub mod tag;
pub mod version;

pub use commit::ParsedCommit;
pub use prerelease::{PreRelease, PreReleaseType};
pub use selection::{development_version, SynthesisSource, VersionSelection};
pub use tag::{Tag, TagPattern, DEFAULT_TAG_PATTERN};
pub use version::{BumpDecision, Version};
