use crate::error::{RelcraftError, Result};
use crate::git::{CommitInfo, Repository, TagRef};
use git2::Oid;
use std::collections::{HashMap, HashSet, VecDeque};

struct MockCommit {
    info: CommitInfo,
    parents: Vec<Oid>,
}

/// In-memory commit graph for testing without a real repository
pub struct MockRepository {
    commits: HashMap<Oid, MockCommit>,
    tags: Vec<TagRef>,
    head: Option<Oid>,
    next_id: u32,
    clock: i64,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: HashMap::new(),
            tags: Vec::new(),
            head: None,
            next_id: 1,
            clock: 1_700_000_000,
        }
    }

    /// Append a commit on top of HEAD and move HEAD to it
    ///
    /// Commit times advance by one minute per commit.
    pub fn add_commit(&mut self, message: &str) -> Oid {
        let parents: Vec<Oid> = self.head.into_iter().collect();
        let oid = self.commit_with_parents(message, &parents);
        self.head = Some(oid);
        oid
    }

    /// Add a commit with explicit parents without moving HEAD
    pub fn commit_with_parents(&mut self, message: &str, parents: &[Oid]) -> Oid {
        self.clock += 60;
        let timestamp = self.clock;
        self.commit_at(message, parents, timestamp)
    }

    /// Add a commit with explicit parents and commit time without moving HEAD
    pub fn commit_at(&mut self, message: &str, parents: &[Oid], timestamp: i64) -> Oid {
        let mut bytes = [0u8; 20];
        bytes[..4].copy_from_slice(&self.next_id.to_be_bytes());
        self.next_id += 1;
        let oid = Oid::from_bytes(&bytes).expect("20 bytes form a valid oid");

        self.commits.insert(
            oid,
            MockCommit {
                info: CommitInfo {
                    hash: oid.to_string(),
                    message: message.to_string(),
                    author: "Test Author".to_string(),
                    timestamp,
                },
                parents: parents.to_vec(),
            },
        );
        oid
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.push(TagRef {
            name: name.into(),
            target: oid,
        });
    }

    /// Point HEAD at a commit
    pub fn set_head(&mut self, oid: Oid) {
        self.head = Some(oid);
    }

    fn reachable(&self, start: Oid) -> Result<HashSet<Oid>> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(oid) = queue.pop_front() {
            if !seen.insert(oid) {
                continue;
            }
            queue.extend(self.parents(oid)?);
        }
        Ok(seen)
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn head_oid(&self) -> Result<Oid> {
        self.head
            .ok_or_else(|| RelcraftError::config("Repository has no commits"))
    }

    fn tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }

    fn commit(&self, oid: Oid) -> Result<CommitInfo> {
        self.commits
            .get(&oid)
            .map(|c| c.info.clone())
            .ok_or_else(|| RelcraftError::config(format!("Commit not found: {}", oid)))
    }

    fn parents(&self, oid: Oid) -> Result<Vec<Oid>> {
        self.commits
            .get(&oid)
            .map(|c| c.parents.clone())
            .ok_or_else(|| RelcraftError::config(format!("Commit not found: {}", oid)))
    }

    fn commits_between(&self, exclude: &[Oid], include: Oid) -> Result<Vec<CommitInfo>> {
        let mut hidden = HashSet::new();
        for oid in exclude {
            hidden.extend(self.reachable(*oid)?);
        }

        let mut commits: Vec<CommitInfo> = self
            .reachable(include)?
            .into_iter()
            .filter(|oid| !hidden.contains(oid))
            .map(|oid| self.commit(oid))
            .collect::<Result<_>>()?;

        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.hash.cmp(&b.hash)));
        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_linear_history() {
        let mut repo = MockRepository::new();
        let first = repo.add_commit("first commit");
        let second = repo.add_commit("second commit");

        assert_eq!(repo.head_oid().unwrap(), second);
        assert_eq!(repo.parents(second).unwrap(), vec![first]);
        assert!(repo.parents(first).unwrap().is_empty());
    }

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        let oid = repo.add_commit("tagged");
        repo.add_tag("v1.0.0", oid);

        let tags = repo.tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "v1.0.0");
        assert_eq!(tags[0].target, oid);
    }

    #[test]
    fn test_mock_repository_graph_difference() {
        let mut repo = MockRepository::new();
        let base = repo.add_commit("base");
        let a = repo.add_commit("a");
        let b = repo.add_commit("b");

        let between = repo.commits_between(&[base], b).unwrap();
        let messages: Vec<&str> = between.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "a"]);

        let all = repo.commits_between(&[], a).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_mock_repository_merge_difference() {
        let mut repo = MockRepository::new();
        let base = repo.add_commit("base");
        let side = repo.commit_with_parents("side", &[base]);
        let main = repo.add_commit("main");
        let merge = repo.commit_with_parents("merge", &[main, side]);

        let between = repo.commits_between(&[base], merge).unwrap();
        assert_eq!(between.len(), 3);
    }

    #[test]
    fn test_mock_repository_empty_head_fails() {
        let repo = MockRepository::default();
        assert!(repo.head_oid().is_err());
    }
}
