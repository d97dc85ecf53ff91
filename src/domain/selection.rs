//! The explicit version input consumed by the builder, projector and orchestrator.

use crate::domain::prerelease::PreRelease;
use crate::domain::version::Version;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Where a synthesized version came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisSource {
    /// Generated from the UTC clock
    Timestamp,
    /// Supplied by the caller (CLI argument or override variable)
    Override,
}

/// The version a build and publish run is stamped with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelection {
    /// HEAD sits exactly on a release tag; its version is used verbatim
    TagResolved { tag: String, version: Version },
    /// No release tag at HEAD; a unique development version stands in
    Synthesized {
        version: Version,
        source: SynthesisSource,
    },
}

impl VersionSelection {
    pub fn version(&self) -> &Version {
        match self {
            VersionSelection::TagResolved { version, .. } => version,
            VersionSelection::Synthesized { version, .. } => version,
        }
    }

    pub fn is_tag_resolved(&self) -> bool {
        matches!(self, VersionSelection::TagResolved { .. })
    }

    /// Synthesize a development version from the given instant
    pub fn development(now: DateTime<Utc>) -> Self {
        VersionSelection::Synthesized {
            version: development_version(now),
            source: SynthesisSource::Timestamp,
        }
    }

    pub fn from_override(version: Version) -> Self {
        VersionSelection::Synthesized {
            version,
            source: SynthesisSource::Override,
        }
    }
}

impl fmt::Display for VersionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelection::TagResolved { tag, version } => {
                write!(f, "{} (release tag {})", version, tag)
            }
            VersionSelection::Synthesized {
                version,
                source: SynthesisSource::Timestamp,
            } => write!(f, "{} (development build)", version),
            VersionSelection::Synthesized {
                version,
                source: SynthesisSource::Override,
            } => write!(f, "{} (override)", version),
        }
    }
}

fn dev_stamp(now: DateTime<Utc>) -> u64 {
    now.format("%Y%m%d%H%M%S%3f")
        .to_string()
        .parse()
        .unwrap_or(0)
}

static LAST_DEV_NUMBER: AtomicU64 = AtomicU64::new(0);

/// `0.0.0.dev<YYYYMMDDHHMMSSmmm>`
///
/// Millisecond precision plus a process-wide monotonic guard: a second call
/// landing on the same (or an earlier) millisecond gets the next number.
pub fn development_version(now: DateTime<Utc>) -> Version {
    let stamp = dev_stamp(now);

    let mut last = LAST_DEV_NUMBER.load(Ordering::SeqCst);
    let number = loop {
        let candidate = stamp.max(last + 1);
        match LAST_DEV_NUMBER.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => break candidate,
            Err(current) => last = current,
        }
    };

    Version::zero().with_prerelease(PreRelease::dev(number))
}
