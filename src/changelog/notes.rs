//! Release note data model and Markdown rendering

use crate::domain::Version;
use chrono::DateTime;
use std::fmt::Write;

/// Heading written at the top of a rendered changelog
pub const CHANGELOG_HEADER: &str =
    "# Changelog\n\nAll notable changes to this project will be documented in this file.\n";

/// One commit listed in the release notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    pub hash: String,
    pub scope: Option<String>,
    pub description: String,
    pub timestamp: i64,
}

impl NoteEntry {
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }
}

/// A titled group of entries ("Features", "Bug Fixes", ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSection {
    pub title: String,
    pub entries: Vec<NoteEntry>,
}

/// What a release block is labelled with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseLabel {
    Unreleased,
    Version(Version),
}

/// The notes for a single release range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub label: ReleaseLabel,
    /// Commit time (seconds) of the commit closing the range, if dated
    pub timestamp: Option<i64>,
    pub sections: Vec<NoteSection>,
}

impl Release {
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.entries.is_empty())
    }

    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    fn heading(&self) -> String {
        let label = match &self.label {
            ReleaseLabel::Unreleased => return "## [Unreleased]".to_string(),
            ReleaseLabel::Version(version) => version.to_string(),
        };
        match self
            .timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
        {
            Some(date) => format!("## [{}] - {}", label, date.format("%Y-%m-%d")),
            None => format!("## [{}]", label),
        }
    }
}

/// Ordered release blocks, newest first
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReleaseNotes {
    pub releases: Vec<Release>,
}

impl ReleaseNotes {
    pub fn is_empty(&self) -> bool {
        self.releases.iter().all(Release::is_empty)
    }

    /// Render release blocks only, without the changelog header
    pub fn render_body(&self) -> String {
        let mut out = String::new();
        for release in &self.releases {
            let _ = writeln!(out, "{}\n", release.heading());
            for section in &release.sections {
                if section.entries.is_empty() {
                    continue;
                }
                let _ = writeln!(out, "### {}\n", section.title);
                for entry in &section.entries {
                    match &entry.scope {
                        Some(scope) => {
                            let _ = writeln!(
                                out,
                                "- **{}:** {} ({})",
                                scope,
                                entry.description,
                                entry.short_hash()
                            );
                        }
                        None => {
                            let _ =
                                writeln!(out, "- {} ({})", entry.description, entry.short_hash());
                        }
                    }
                }
                out.push('\n');
            }
        }
        out
    }

    /// Render a complete changelog document
    pub fn to_markdown(&self) -> String {
        let body = self.render_body();
        if body.is_empty() {
            return CHANGELOG_HEADER.to_string();
        }
        let mut out = format!("{}\n{}", CHANGELOG_HEADER, body);
        // exactly one trailing newline
        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }
}
