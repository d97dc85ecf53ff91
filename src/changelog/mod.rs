//! Release notes derived from commit history
//!
//! [`ChangelogGenerator::render`] is side-effect free for every range;
//! only [`ChangelogGenerator::write_changelog`] persists output.

pub mod generator;
pub mod notes;

pub use generator::{ChangelogGenerator, ChangelogRange};
pub use notes::{NoteEntry, NoteSection, Release, ReleaseLabel, ReleaseNotes};
