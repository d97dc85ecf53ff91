use crate::domain::version::Version;
use crate::error::{RelcraftError, Result};
use regex::Regex;

/// Default pattern a tag must match to count as a release tag
pub const DEFAULT_TAG_PATTERN: &str = r"^v?[0-9]+\.[0-9]+\.[0-9]+$";

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }
}

/// Anchored pattern identifying release tags
#[derive(Debug, Clone)]
pub struct TagPattern {
    regex: Regex,
}

impl TagPattern {
    /// Compile a tag pattern; the pattern must be anchored at both ends
    pub fn new(pattern: &str) -> Result<Self> {
        if !pattern.starts_with('^') || !pattern.ends_with('$') {
            return Err(RelcraftError::config(format!(
                "Tag pattern must be anchored with ^ and $: '{}'",
                pattern
            )));
        }

        let regex = Regex::new(pattern).map_err(|e| {
            RelcraftError::config(format!("Invalid tag pattern '{}': {}", pattern, e))
        })?;

        Ok(TagPattern { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether a tag name counts as a release tag
    pub fn matches(&self, tag: &str) -> bool {
        self.regex.is_match(tag)
    }

    /// Version carried by a release tag; `None` for tags the pattern ignores
    pub fn release_version(&self, tag: &Tag) -> Option<Version> {
        if !self.matches(&tag.name) {
            return None;
        }
        // custom patterns may carry a prefix other than `v`
        let start = tag.name.find(|c: char| c.is_ascii_digit())?;
        Version::parse(&tag.name[start..]).ok()
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern::new(DEFAULT_TAG_PATTERN).expect("default tag pattern is valid")
    }
}
