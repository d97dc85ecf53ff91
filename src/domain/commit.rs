use regex::Regex;
use std::sync::OnceLock;

/// Type assigned to commits that do not follow the conventional format
pub const OTHER_TYPE: &str = "other";

/// Footers that mark a commit as breaking when no custom list is configured
pub const DEFAULT_BREAKING_INDICATORS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)(?:\(([^)]+)\))?(!)?:\s*(.*)$").expect("header pattern is valid")
    })
}

/// Parsed representation of a conventional commit message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: String,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
}

impl ParsedCommit {
    /// Parse a commit message according to conventional commits
    ///
    /// Supports formats:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    /// - non-conventional text (type "other")
    pub fn parse(message: &str) -> Self {
        Self::parse_with_indicators(message, &DEFAULT_BREAKING_INDICATORS)
    }

    /// Parse using a custom list of breaking-change footers
    pub fn parse_with_indicators<S: AsRef<str>>(message: &str, indicators: &[S]) -> Self {
        let header = message.lines().next().unwrap_or("").trim();
        let has_footer = indicators
            .iter()
            .any(|indicator| message.contains(indicator.as_ref()));

        if let Some(captures) = header_regex().captures(header) {
            let description = captures
                .get(4)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            if !description.is_empty() {
                return ParsedCommit {
                    r#type: captures[1].to_lowercase(),
                    scope: captures.get(2).map(|m| m.as_str().trim().to_string()),
                    description,
                    is_breaking_change: captures.get(3).is_some() || has_footer,
                };
            }
        }

        ParsedCommit {
            r#type: OTHER_TYPE.to_string(),
            scope: None,
            description: header.to_string(),
            is_breaking_change: has_footer,
        }
    }

    pub fn is_feature(&self) -> bool {
        matches!(self.r#type.as_str(), "feat" | "feature")
    }

    pub fn is_fix(&self) -> bool {
        self.r#type == "fix"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_scope() {
        let commit = ParsedCommit::parse("feat(auth): add login");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, Some("auth".to_string()));
        assert_eq!(commit.description, "add login");
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_with_breaking_marker() {
        let commit = ParsedCommit::parse("feat(auth)!: redesign login");
        assert_eq!(commit.r#type, "feat");
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_breaking_without_scope() {
        let commit = ParsedCommit::parse("feat!: redesign");
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope, None);
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_non_conventional() {
        let commit = ParsedCommit::parse("Random commit message");
        assert_eq!(commit.r#type, OTHER_TYPE);
        assert_eq!(commit.description, "Random commit message");
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_breaking_change_footer() {
        let commit = ParsedCommit::parse("fix: something\n\nBREAKING CHANGE: desc");
        assert!(commit.is_breaking_change);
        assert_eq!(commit.description, "something");
    }

    #[test]
    fn test_parse_only_reads_first_line() {
        let commit = ParsedCommit::parse("Merge branch 'x'\n\nfeat: hidden in body");
        assert_eq!(commit.r#type, OTHER_TYPE);
    }

    #[test]
    fn test_parse_uppercase_type_is_normalized() {
        let commit = ParsedCommit::parse("Fix: typo");
        assert_eq!(commit.r#type, "fix");
        assert!(commit.is_fix());
    }

    #[test]
    fn test_parse_empty_subject_is_other() {
        let commit = ParsedCommit::parse("feat:");
        assert_eq!(commit.r#type, OTHER_TYPE);
    }

    #[test]
    fn test_parse_custom_indicators() {
        let commit = ParsedCommit::parse_with_indicators("chore: x\n\nDROPS: api", &["DROPS:"]);
        assert!(commit.is_breaking_change);
    }
}
