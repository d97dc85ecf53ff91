//! Pre-release version handling
//!
//! Supports development builds (`dev`), the usual alpha/beta/rc channels and custom
//! identifiers, each with an optional iteration number. Development identifiers
//! render in the package-index style (`dev20261018120000123`); every other
//! identifier renders semver style (`beta.1`). `to_pep440` gives the spelling
//! Python build backends write into file names (`b1`).

use crate::error::{RelcraftError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Pre-release identifier type, ordered dev < alpha < beta < rc < custom
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseType {
    /// Development snapshot
    Dev,
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
    /// Release candidate
    ReleaseCandidate,
    /// Custom pre-release identifier
    Custom(String),
}

impl PreReleaseType {
    /// Parse a pre-release type from a string
    ///
    /// Accepts: "dev", "alpha", "a", "beta", "b", "rc", or any custom alphanumeric-hyphen string
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for PreReleaseType {
    type Err = RelcraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(PreReleaseType::Dev),
            "alpha" | "a" => Ok(PreReleaseType::Alpha),
            "beta" | "b" => Ok(PreReleaseType::Beta),
            "rc" => Ok(PreReleaseType::ReleaseCandidate),
            other => {
                if !other.is_empty() && other.chars().all(|c| c.is_alphanumeric() || c == '-') {
                    Ok(PreReleaseType::Custom(other.to_string()))
                } else {
                    Err(RelcraftError::version(format!(
                        "Invalid pre-release identifier: '{}'",
                        s
                    )))
                }
            }
        }
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreReleaseType::Dev => write!(f, "dev"),
            PreReleaseType::Alpha => write!(f, "alpha"),
            PreReleaseType::Beta => write!(f, "beta"),
            PreReleaseType::ReleaseCandidate => write!(f, "rc"),
            PreReleaseType::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// Pre-release version with optional iteration number
///
/// # Examples
/// - "alpha" -> PreRelease { identifier: Alpha, iteration: None }
/// - "beta.1" -> PreRelease { identifier: Beta, iteration: Some(1) }
/// - "dev42" -> PreRelease { identifier: Dev, iteration: Some(42) }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreRelease {
    /// The pre-release identifier
    pub identifier: PreReleaseType,
    /// Optional iteration number; development builds store their timestamp here
    pub iteration: Option<u64>,
}

impl PreRelease {
    pub fn new(identifier: PreReleaseType, iteration: Option<u64>) -> Self {
        PreRelease {
            identifier,
            iteration,
        }
    }

    /// Development pre-release with the given sequence number
    pub fn dev(number: u64) -> Self {
        PreRelease::new(PreReleaseType::Dev, Some(number))
    }

    pub fn is_dev(&self) -> bool {
        self.identifier == PreReleaseType::Dev
    }

    /// Parse a pre-release version from a string
    ///
    /// Accepts formats like "beta", "beta.1", "rc.2", "dev123" or "custom-id.5"
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(RelcraftError::version("Empty pre-release identifier"));
        }

        // dev123 and rc1 carry their number without a separator
        let lower = s.to_lowercase();
        if let Some(idx) = lower.find(|c: char| c.is_ascii_digit()) {
            let (name, digits) = lower.split_at(idx);
            let compact = matches!(name, "dev" | "a" | "alpha" | "b" | "beta" | "rc");
            if compact && digits.chars().all(|c| c.is_ascii_digit()) {
                let number = digits.parse::<u64>().map_err(|_| {
                    RelcraftError::version(format!("Invalid pre-release number: '{}'", digits))
                })?;
                return Ok(PreRelease::new(PreReleaseType::parse(name)?, Some(number)));
            }
        }

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 2 {
            return Err(RelcraftError::version(format!(
                "Invalid pre-release format: '{}'",
                s
            )));
        }

        let identifier = PreReleaseType::parse(parts[0])?;

        let iteration = if parts.len() > 1 {
            Some(parts[1].parse::<u64>().map_err(|_| {
                RelcraftError::version(format!("Invalid iteration number: '{}'", parts[1]))
            })?)
        } else {
            None
        };

        Ok(PreRelease {
            identifier,
            iteration,
        })
    }

    /// Package-index spelling: `rc1`, `b2`, `.dev42`, or a local label for
    /// custom identifiers
    pub fn to_pep440(&self) -> String {
        let number = self.iteration.unwrap_or(0);
        match &self.identifier {
            PreReleaseType::Dev => format!(".dev{}", number),
            PreReleaseType::Alpha => format!("a{}", number),
            PreReleaseType::Beta => format!("b{}", number),
            PreReleaseType::ReleaseCandidate => format!("rc{}", number),
            PreReleaseType::Custom(label) => match self.iteration {
                Some(n) => format!("+{}.{}", label, n),
                None => format!("+{}", label),
            },
        }
    }
}

impl Ord for PreRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier
            .cmp(&other.identifier)
            .then_with(|| self.iteration.cmp(&other.iteration))
    }
}

impl PartialOrd for PreRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier)?;
        match (self.iteration, self.is_dev()) {
            (Some(n), true) => write!(f, "{}", n),
            (Some(n), false) => write!(f, ".{}", n),
            (None, _) => Ok(()),
        }
    }
}
