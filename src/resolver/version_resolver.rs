use crate::domain::commit::DEFAULT_BREAKING_INDICATORS;
use crate::domain::{BumpDecision, ParsedCommit, Tag, TagPattern, Version};
use crate::error::{RelcraftError, Result};
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// How the next version's bump is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BumpPolicy {
    /// Infer the bump from unreleased conventional commits
    #[default]
    Conventional,
    /// Apply the given bump regardless of commit contents
    Fixed(BumpDecision),
}

/// The release tag nearest to HEAD
#[derive(Debug, Clone, PartialEq)]
pub struct NearestTag {
    pub name: String,
    pub version: Version,
    pub target: Oid,
    /// Number of parent hops from HEAD
    pub distance: usize,
}

/// Decide the bump for a set of unreleased commits
///
/// Breaking beats feature beats everything else; an empty set is `None`.
pub fn decide_bump(commits: &[ParsedCommit]) -> BumpDecision {
    commits
        .iter()
        .map(|commit| {
            if commit.is_breaking_change {
                BumpDecision::Major
            } else if commit.is_feature() {
                BumpDecision::Minor
            } else {
                BumpDecision::Patch
            }
        })
        .max()
        .unwrap_or(BumpDecision::None)
}

/// Sole authority for computing the current and next version
pub struct VersionResolver<'a, R: Repository> {
    repo: &'a R,
    pattern: TagPattern,
    static_version: Option<Version>,
    breaking_indicators: Vec<String>,
}

impl<'a, R: Repository> VersionResolver<'a, R> {
    /// Create a resolver; `static_version` is the version declared in project
    /// metadata, `None` when the version is tag-derived
    pub fn new(repo: &'a R, pattern: TagPattern, static_version: Option<Version>) -> Self {
        VersionResolver {
            repo,
            pattern,
            static_version,
            breaking_indicators: DEFAULT_BREAKING_INDICATORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn with_breaking_indicators(mut self, indicators: Vec<String>) -> Self {
        self.breaking_indicators = indicators;
        self
    }

    pub fn repository(&self) -> &'a R {
        self.repo
    }

    pub fn pattern(&self) -> &TagPattern {
        &self.pattern
    }

    /// Release tags grouped by the commit they point at; other tags are ignored
    pub fn release_tags(&self) -> Result<HashMap<Oid, Vec<(String, Version)>>> {
        let mut by_commit: HashMap<Oid, Vec<(String, Version)>> = HashMap::new();
        for tag in self.repo.tags()? {
            match self.pattern.release_version(&Tag::new(tag.name.as_str())) {
                Some(version) => by_commit
                    .entry(tag.target)
                    .or_default()
                    .push((tag.name, version)),
                None => debug!(tag = %tag.name, "ignoring tag outside the release pattern"),
            }
        }
        Ok(by_commit)
    }

    /// Nearest ancestor release tag of HEAD, searched breadth-first by distance
    ///
    /// Fails with `AmbiguousTag` when several tags naming different versions
    /// sit at the same minimal distance.
    pub fn latest_tag(&self) -> Result<Option<NearestTag>> {
        let tags = self.release_tags()?;
        if tags.is_empty() {
            return Ok(None);
        }

        let mut level = vec![self.repo.head_oid()?];
        let mut seen: HashSet<Oid> = level.iter().copied().collect();
        let mut distance = 0;

        while !level.is_empty() {
            let mut found: Vec<(String, Version, Oid)> = level
                .iter()
                .filter_map(|oid| tags.get(oid).map(|names| (oid, names)))
                .flat_map(|(oid, names)| {
                    names
                        .iter()
                        .map(move |(name, version)| (name.clone(), version.clone(), *oid))
                })
                .collect();

            if !found.is_empty() {
                found.sort_by(|a, b| a.0.cmp(&b.0));
                let versions: HashSet<&Version> = found.iter().map(|(_, v, _)| v).collect();
                if versions.len() > 1 {
                    return Err(RelcraftError::AmbiguousTag {
                        tags: found.into_iter().map(|(name, _, _)| name).collect(),
                    });
                }

                let (name, version, target) = found.swap_remove(0);
                debug!(tag = %name, distance, "resolved nearest release tag");
                return Ok(Some(NearestTag {
                    name,
                    version,
                    target,
                    distance,
                }));
            }

            let mut next_level = Vec::new();
            for oid in &level {
                for parent in self.repo.parents(*oid)? {
                    if seen.insert(parent) {
                        next_level.push(parent);
                    }
                }
            }
            level = next_level;
            distance += 1;
        }

        Ok(None)
    }

    /// Release tag pointing exactly at HEAD, if any
    pub fn head_tag(&self) -> Result<Option<NearestTag>> {
        Ok(self.latest_tag()?.filter(|tag| tag.distance == 0))
    }

    /// The current version
    ///
    /// A statically declared version wins; otherwise the nearest release tag,
    /// falling back to `0.0.0` when none exists.
    pub fn current(&self) -> Result<Version> {
        if let Some(version) = &self.static_version {
            return Ok(version.clone());
        }
        Ok(self
            .latest_tag()?
            .map(|tag| tag.version)
            .unwrap_or_else(Version::zero))
    }

    /// Commits reachable from HEAD but not from the nearest release tag
    ///
    /// Without any release tag the whole history is unreleased.
    pub fn unreleased_commits(&self) -> Result<Vec<CommitInfo>> {
        let head = self.repo.head_oid()?;
        let exclude: Vec<Oid> = self.latest_tag()?.map(|t| t.target).into_iter().collect();
        self.repo.commits_between(&exclude, head)
    }

    /// Classify commits with the configured breaking-change footers
    pub fn classify(&self, commits: &[CommitInfo]) -> Vec<ParsedCommit> {
        commits
            .iter()
            .map(|c| ParsedCommit::parse_with_indicators(&c.message, &self.breaking_indicators))
            .collect()
    }

    /// Bump inferred from the unreleased commits
    pub fn bump_decision(&self) -> Result<BumpDecision> {
        let commits = self.unreleased_commits()?;
        Ok(decide_bump(&self.classify(&commits)))
    }

    /// The next version: current plus the bump chosen by `policy`
    pub fn next(&self, policy: BumpPolicy) -> Result<Version> {
        let current = self.current()?;
        let decision = match policy {
            BumpPolicy::Conventional => self.bump_decision()?,
            BumpPolicy::Fixed(decision) => decision,
        };
        debug!(%current, %decision, "computing next version");
        Ok(current.bump(decision))
    }
}
