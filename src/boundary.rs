use std::fmt;

/// Non-fatal conditions noticed during a run.
/// These are reported to the user but never change the outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No new commits since the latest release tag
    NoUnreleasedCommits { latest_tag: String, head: String },
    /// Tag exists but doesn't match the release pattern
    TagMismatchPattern { tag: String, pattern: String },
    /// HEAD is not on a release tag, so a development version was synthesized
    DevelopmentVersion { version: String },
    /// Dry run found the version already published
    VersionAlreadyPublished { name: String, version: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoUnreleasedCommits { latest_tag, head } => {
                let short_hash = if head.len() > 7 { &head[..7] } else { head.as_str() };
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    latest_tag, short_hash
                )
            }
            BoundaryWarning::TagMismatchPattern { tag, pattern } => {
                write!(f, "Tag '{}' does not match pattern '{}'", tag, pattern)
            }
            BoundaryWarning::DevelopmentVersion { version } => {
                write!(f, "HEAD is not on a release tag; using development version {}", version)
            }
            BoundaryWarning::VersionAlreadyPublished { name, version } => {
                write!(
                    f,
                    "{} {} already exists on the package index; a real publish would be rejected",
                    name, version
                )
            }
        }
    }
}
