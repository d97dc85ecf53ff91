use crate::error::{RelcraftError, Result};
use crate::git::{CommitInfo, TagRef};
use git2::{Oid, Repository as Git2Repo, Sort};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path.as_ref()).map_err(|e| {
            RelcraftError::config(format!(
                "Not in a git repository ({}): {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn commit_info(commit: &git2::Commit<'_>) -> CommitInfo {
        CommitInfo {
            hash: commit.id().to_string(),
            message: commit.message().unwrap_or("(empty message)").to_string(),
            author: commit.author().name().unwrap_or("unknown").to_string(),
            timestamp: commit.time().seconds(),
        }
    }
}

impl super::Repository for Git2Repository {
    fn head_oid(&self) -> Result<Oid> {
        let head = self.repo.head()?;
        let commit = head.peel_to_commit()?;
        Ok(commit.id())
    }

    fn tags(&self) -> Result<Vec<TagRef>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = Vec::new();

        for name in names.iter().flatten() {
            let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
            // tags pointing at trees or blobs never bound a release
            match reference.peel_to_commit() {
                Ok(commit) => tags.push(TagRef {
                    name: name.to_string(),
                    target: commit.id(),
                }),
                Err(e) => {
                    debug!(tag = name, error = %e, "skipping tag that does not point at a commit")
                }
            }
        }

        Ok(tags)
    }

    fn commit(&self, oid: Oid) -> Result<CommitInfo> {
        let commit = self.repo.find_commit(oid)?;
        Ok(Self::commit_info(&commit))
    }

    fn parents(&self, oid: Oid) -> Result<Vec<Oid>> {
        let commit = self.repo.find_commit(oid)?;
        Ok(commit.parent_ids().collect())
    }

    fn commits_between(&self, exclude: &[Oid], include: Oid) -> Result<Vec<CommitInfo>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(include)?;
        for oid in exclude {
            revwalk.hide(*oid)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(Self::commit_info(&commit));
        }

        Ok(commits)
    }
}
