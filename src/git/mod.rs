//! Commit history reader
//!
//! This module provides a trait-based abstraction over the read-only git
//! operations the release pipeline needs: HEAD, tags, commit metadata,
//! parent links and graph differences.
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory commit graph for tests
//!
//! ```rust
//! # use relcraft::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> relcraft::Result<()> {
//! let head = repo.head_oid()?;
//! let commits = repo.commits_between(&[], head)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The full commit hash
    pub hash: String,
    /// The commit message
    pub message: String,
    /// The commit author
    pub author: String,
    /// Commit time in seconds since the Unix epoch
    pub timestamp: i64,
}

impl CommitInfo {
    /// First seven characters of the hash
    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(7);
        &self.hash[..end]
    }
}

/// A tag name together with the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub target: Oid,
}

/// Read-only view of a repository's history
///
/// Implementations map their underlying errors to
/// [crate::error::RelcraftError] variants.
pub trait Repository {
    /// Commit OID that HEAD resolves to
    fn head_oid(&self) -> Result<Oid>;

    /// Every tag in the repository, peeled to the commit it points at
    fn tags(&self) -> Result<Vec<TagRef>>;

    /// Metadata of a single commit
    fn commit(&self, oid: Oid) -> Result<CommitInfo>;

    /// Parent OIDs of a commit, first parent first
    fn parents(&self, oid: Oid) -> Result<Vec<Oid>>;

    /// Commits reachable from `include` but not from any of `exclude`
    ///
    /// Returned newest first by commit time.
    fn commits_between(&self, exclude: &[Oid], include: Oid) -> Result<Vec<CommitInfo>>;
}
