use crate::changelog::notes::{NoteEntry, NoteSection, Release, ReleaseLabel, ReleaseNotes};
use crate::config::ConventionalCommitsConfig;
use crate::domain::{ParsedCommit, Tag, TagPattern, Version};
use crate::error::Result;
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

const BREAKING_TITLE: &str = "Breaking Changes";
const OTHER_TITLE: &str = "Other";

/// Which commits a render covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogRange {
    /// Every release tag boundary plus any unreleased commits
    All,
    /// Commits since the last release tag
    Unreleased,
    /// The unreleased commits, labelled as if released under the given version
    Hypothetical(Version),
}

/// Groups commits into categorized release notes
pub struct ChangelogGenerator<'a, R: Repository> {
    repo: &'a R,
    pattern: TagPattern,
    config: &'a ConventionalCommitsConfig,
}

struct Boundary {
    version: Version,
    target: Oid,
}

impl<'a, R: Repository> ChangelogGenerator<'a, R> {
    pub fn new(repo: &'a R, pattern: TagPattern, config: &'a ConventionalCommitsConfig) -> Self {
        ChangelogGenerator {
            repo,
            pattern,
            config,
        }
    }

    /// Render release notes for a range; never touches the filesystem
    pub fn render(&self, range: &ChangelogRange) -> Result<ReleaseNotes> {
        let head = self.repo.head_oid()?;
        let boundaries = self.boundaries(head)?;
        let all_targets: Vec<Oid> = boundaries.iter().map(|b| b.target).collect();

        let unreleased = self.repo.commits_between(&all_targets, head)?;
        let mut releases = Vec::new();

        match range {
            ChangelogRange::Unreleased => {
                releases.push(self.release(ReleaseLabel::Unreleased, None, &unreleased));
            }
            ChangelogRange::Hypothetical(version) => {
                let stamp = self.repo.commit(head)?.timestamp;
                releases.push(self.release(
                    ReleaseLabel::Version(version.clone()),
                    Some(stamp),
                    &unreleased,
                ));
            }
            ChangelogRange::All => {
                if !unreleased.is_empty() {
                    releases.push(self.release(ReleaseLabel::Unreleased, None, &unreleased));
                }
                // newest first; each release excludes everything reachable from older ones
                for (idx, boundary) in boundaries.iter().enumerate().rev() {
                    let older: Vec<Oid> = boundaries[..idx].iter().map(|b| b.target).collect();
                    let commits = self.repo.commits_between(&older, boundary.target)?;
                    let stamp = self.repo.commit(boundary.target)?.timestamp;
                    releases.push(self.release(
                        ReleaseLabel::Version(boundary.version.clone()),
                        Some(stamp),
                        &commits,
                    ));
                }
            }
        }

        Ok(ReleaseNotes { releases })
    }

    /// Render the full history and persist it to `path`
    pub fn write_changelog(&self, path: &Path) -> Result<ReleaseNotes> {
        let notes = self.render(&ChangelogRange::All)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, notes.to_markdown())?;
        info!(path = %path.display(), releases = notes.releases.len(), "wrote changelog");
        Ok(notes)
    }

    /// Release tags reachable from HEAD, oldest version first, one per version
    fn boundaries(&self, head: Oid) -> Result<Vec<Boundary>> {
        let reachable: HashSet<String> = self
            .repo
            .commits_between(&[], head)?
            .into_iter()
            .map(|c| c.hash)
            .collect();

        let mut by_version: BTreeMap<Version, Oid> = BTreeMap::new();
        let mut tags = self.repo.tags()?;
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        for tag in tags {
            if !reachable.contains(&tag.target.to_string()) {
                continue;
            }
            if let Some(version) = self.pattern.release_version(&Tag::new(tag.name.as_str())) {
                by_version.entry(version).or_insert(tag.target);
            }
        }

        Ok(by_version
            .into_iter()
            .map(|(version, target)| Boundary { version, target })
            .collect())
    }

    fn release(
        &self,
        label: ReleaseLabel,
        timestamp: Option<i64>,
        commits: &[CommitInfo],
    ) -> Release {
        let mut buckets: BTreeMap<usize, Vec<NoteEntry>> = BTreeMap::new();
        let mut titles: BTreeMap<usize, String> = BTreeMap::new();

        for commit in commits {
            let parsed = ParsedCommit::parse_with_indicators(
                &commit.message,
                &self.config.breaking_change_indicators,
            );
            let (rank, title) = self.section_for(&parsed);
            titles.entry(rank).or_insert(title);
            buckets.entry(rank).or_default().push(NoteEntry {
                hash: commit.hash.clone(),
                scope: parsed.scope,
                description: parsed.description,
                timestamp: commit.timestamp,
            });
        }

        let sections = buckets
            .into_iter()
            .map(|(rank, mut entries)| {
                entries.sort_by(|a, b| {
                    b.timestamp
                        .cmp(&a.timestamp)
                        .then_with(|| a.hash.cmp(&b.hash))
                });
                NoteSection {
                    title: titles.remove(&rank).unwrap_or_default(),
                    entries,
                }
            })
            .collect();

        Release {
            label,
            timestamp,
            sections,
        }
    }

    /// Fixed section order: breaking, features, fixes, configured types, other
    fn section_for(&self, commit: &ParsedCommit) -> (usize, String) {
        if commit.is_breaking_change {
            return (0, BREAKING_TITLE.to_string());
        }
        if commit.is_feature() {
            return (1, self.title_for("feat", "Features"));
        }
        if commit.is_fix() {
            return (2, self.title_for("fix", "Bug Fixes"));
        }
        match self.config.types.iter().position(|t| *t == commit.r#type) {
            Some(idx) => (3 + idx, self.title_for(&commit.r#type, &commit.r#type)),
            None => (3 + self.config.types.len(), OTHER_TITLE.to_string()),
        }
    }

    fn title_for(&self, commit_type: &str, fallback: &str) -> String {
        self.config
            .section_titles
            .get(commit_type)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn history() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit("chore: scaffold");
        let first = repo.add_commit("feat(xml): parse recipes");
        repo.add_tag("v0.1.0", first);
        repo.add_commit("fix(excel): keep column widths");
        let second = repo.add_commit("feat: export phases");
        repo.add_tag("v0.2.0", second);
        repo.add_tag("build-42", second);
        repo.add_commit("docs: usage guide");
        repo.add_commit("feat(cli)!: rename flags");
        repo.add_commit("tidy things up");
        repo
    }

    fn section_titles(release: &Release) -> Vec<&str> {
        release.sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_unreleased_groups_in_fixed_order() {
        let repo = history();
        let config = ConventionalCommitsConfig::default();
        let generator = ChangelogGenerator::new(&repo, TagPattern::default(), &config);

        let notes = generator.render(&ChangelogRange::Unreleased).unwrap();
        assert_eq!(notes.releases.len(), 1);
        let release = &notes.releases[0];
        assert_eq!(release.label, ReleaseLabel::Unreleased);
        assert_eq!(
            section_titles(release),
            vec!["Breaking Changes", "Documentation", "Other"]
        );
        assert_eq!(release.entry_count(), 3);
    }

    #[test]
    fn test_all_covers_every_tag_boundary() {
        let repo = history();
        let config = ConventionalCommitsConfig::default();
        let generator = ChangelogGenerator::new(&repo, TagPattern::default(), &config);

        let notes = generator.render(&ChangelogRange::All).unwrap();
        let labels: Vec<&ReleaseLabel> = notes.releases.iter().map(|r| &r.label).collect();
        assert_eq!(
            labels,
            vec![
                &ReleaseLabel::Unreleased,
                &ReleaseLabel::Version(Version::new(0, 2, 0)),
                &ReleaseLabel::Version(Version::new(0, 1, 0)),
            ]
        );
        assert_eq!(section_titles(&notes.releases[1]), vec!["Features", "Bug Fixes"]);
        assert_eq!(notes.releases[2].entry_count(), 2);
    }

    #[test]
    fn test_entries_are_reverse_chronological() {
        let mut repo = MockRepository::new();
        repo.add_commit("fix: older");
        repo.add_commit("fix: newer");
        let config = ConventionalCommitsConfig::default();
        let generator = ChangelogGenerator::new(&repo, TagPattern::default(), &config);

        let notes = generator.render(&ChangelogRange::Unreleased).unwrap();
        let descriptions: Vec<&str> = notes.releases[0].sections[0]
            .entries
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["newer", "older"]);
    }

    #[test]
    fn test_unreleased_render_is_idempotent() {
        let repo = history();
        let config = ConventionalCommitsConfig::default();
        let generator = ChangelogGenerator::new(&repo, TagPattern::default(), &config);

        let first = generator.render(&ChangelogRange::Unreleased).unwrap().to_markdown();
        let second = generator.render(&ChangelogRange::Unreleased).unwrap().to_markdown();
        assert_eq!(first, second);
    }

    #[test]
    fn test_hypothetical_is_labelled_with_supplied_version() {
        let repo = history();
        let config = ConventionalCommitsConfig::default();
        let generator = ChangelogGenerator::new(&repo, TagPattern::default(), &config);

        let notes = generator
            .render(&ChangelogRange::Hypothetical(Version::new(1, 0, 0)))
            .unwrap();
        assert_eq!(notes.releases.len(), 1);
        assert_eq!(
            notes.releases[0].label,
            ReleaseLabel::Version(Version::new(1, 0, 0))
        );
        assert!(notes.releases[0].timestamp.is_some());
        assert!(notes.to_markdown().contains("## [1.0.0] - "));
    }

    #[test]
    fn test_write_changelog_persists_all() {
        let repo = history();
        let config = ConventionalCommitsConfig::default();
        let generator = ChangelogGenerator::new(&repo, TagPattern::default(), &config);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docs").join("CHANGELOG.md");

        let notes = generator.write_changelog(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, notes.to_markdown());
        assert!(written.contains("## [0.1.0]"));
    }
}
