use crate::domain::prerelease::PreRelease;
use crate::error::{RelcraftError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[vV]?(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z.-]+)|\.(dev\d*)|((?:a|alpha|b|beta|rc)\d*))?$",
        )
        .expect("version pattern is valid")
    })
}

/// Semantic version representation
///
/// Ordering compares major, minor and patch numerically; a release without
/// pre-release outranks any pre-release of the same triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<PreRelease>,
}

impl Version {
    /// Create a new release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// The `0.0.0` baseline used when no release exists yet
    pub fn zero() -> Self {
        Version::new(0, 0, 0)
    }

    pub fn with_prerelease(mut self, prerelease: PreRelease) -> Self {
        self.prerelease = Some(prerelease);
        self
    }

    /// Parse version from a tag string (e.g., "v1.2.3" -> Version(1,2,3))
    ///
    /// Also accepts "1.2.3-rc.1", its package-index spelling "1.2.3rc1" and the
    /// development form "0.0.0.dev42".
    pub fn parse(tag: &str) -> Result<Self> {
        let captures = version_regex().captures(tag.trim()).ok_or_else(|| {
            RelcraftError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                tag
            ))
        })?;

        let number = |idx: usize| -> Result<u64> {
            let raw = &captures[idx];
            raw.parse::<u64>()
                .map_err(|_| RelcraftError::version(format!("Invalid version number: {}", raw)))
        };

        let prerelease = match captures
            .get(4)
            .or_else(|| captures.get(5))
            .or_else(|| captures.get(6))
        {
            Some(m) => Some(PreRelease::parse(m.as_str())?),
            None => None,
        };

        Ok(Version {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            prerelease,
        })
    }

    /// Bump version according to bump decision; any pre-release is dropped
    pub fn bump(&self, decision: BumpDecision) -> Self {
        match decision {
            BumpDecision::Major => Version::new(self.major + 1, 0, 0),
            BumpDecision::Minor => Version::new(self.major, self.minor + 1, 0),
            BumpDecision::Patch => Version::new(self.major, self.minor, self.patch + 1),
            BumpDecision::None => self.clone(),
        }
    }

    /// Package-index spelling used in distribution file names and index URLs
    ///
    /// `1.0.0-rc.1` becomes `1.0.0rc1`; releases and development versions are
    /// unchanged.
    pub fn to_pep440(&self) -> String {
        let release = format!("{}.{}.{}", self.major, self.minor, self.patch);
        match &self.prerelease {
            Some(pre) => format!("{}{}", release, pre.to_pep440()),
            None => release,
        }
    }

    /// Four-component numeric form used by native executable resources
    pub fn file_version(&self) -> [u64; 4] {
        [self.major, self.minor, self.patch, 0]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = RelcraftError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        match &self.prerelease {
            Some(pre) if pre.is_dev() => write!(f, ".{}", pre),
            Some(pre) => write!(f, "-{}", pre),
            None => Ok(()),
        }
    }
}

/// Version bump decision derived from unreleased commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BumpDecision {
    None,
    Patch,
    Minor,
    Major,
}

impl BumpDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpDecision::None => "none",
            BumpDecision::Patch => "patch",
            BumpDecision::Minor => "minor",
            BumpDecision::Major => "major",
        }
    }
}

impl fmt::Display for BumpDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BumpDecision {
    type Err = RelcraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(BumpDecision::None),
            "patch" => Ok(BumpDecision::Patch),
            "minor" => Ok(BumpDecision::Minor),
            "major" => Ok(BumpDecision::Major),
            other => Err(RelcraftError::version(format!(
                "Unknown bump type: '{}'",
                other
            ))),
        }
    }
}
