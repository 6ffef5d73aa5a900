//! In-memory [`RepositorySource`] for offline runs and tests.

use std::collections::{HashMap, HashSet};

use ghpulse_core::{
    Commit, Contributor, FileChange, PulseError, PullRequest, RepositorySource, ReviewComment,
};

/// A repository snapshot held entirely in memory.
///
/// Commits and pull requests can be marked unreadable to exercise the
/// skip-and-log paths.
///
/// # Examples
///
/// ```
/// use ghpulse_core::{Commit, FileChange};
/// use ghpulse_stats::memory::MemorySource;
///
/// let source = MemorySource::new().with_commit(
///     Commit { sha: "a1".into(), author: Some("alice".into()), date: None },
///     vec![FileChange { path: "x.txt".into(), lines_added: 5 }],
/// );
/// assert_eq!(source.commit_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    commits: Vec<Commit>,
    files: HashMap<String, Vec<FileChange>>,
    unreadable_commits: HashSet<String>,
    pulls: Vec<PullRequest>,
    comments: HashMap<u64, Vec<ReviewComment>>,
    unreadable_pulls: HashSet<u64>,
    contributors: Vec<Contributor>,
}

impl MemorySource {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit together with the files it changed.
    pub fn with_commit(mut self, commit: Commit, files: Vec<FileChange>) -> Self {
        self.files.insert(commit.sha.clone(), files);
        self.commits.push(commit);
        self
    }

    /// Add a commit whose file lookup fails with an API error.
    pub fn with_unreadable_commit(mut self, commit: Commit) -> Self {
        self.unreadable_commits.insert(commit.sha.clone());
        self.commits.push(commit);
        self
    }

    /// Add a pull request together with its review comments.
    pub fn with_pull(mut self, pull: PullRequest, comments: Vec<ReviewComment>) -> Self {
        self.comments.insert(pull.number, comments);
        self.pulls.push(pull);
        self
    }

    /// Add a pull request whose review-comment lookup fails with an API error.
    pub fn with_unreadable_pull(mut self, pull: PullRequest) -> Self {
        self.unreadable_pulls.insert(pull.number);
        self.pulls.push(pull);
        self
    }

    /// Add a contributor.
    pub fn with_contributor(mut self, login: &str, contributions: u64) -> Self {
        self.contributors.push(Contributor {
            login: login.to_string(),
            contributions,
        });
        self
    }

    /// Number of commits in the snapshot.
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }
}

impl RepositorySource for MemorySource {
    async fn list_commits(&self) -> Result<Vec<Commit>, PulseError> {
        Ok(self.commits.clone())
    }

    async fn commit_files(&self, sha: &str) -> Result<Vec<FileChange>, PulseError> {
        if self.unreadable_commits.contains(sha) {
            return Err(PulseError::Api(format!("failed to fetch commit {sha}")));
        }
        self.files
            .get(sha)
            .cloned()
            .ok_or_else(|| PulseError::NotFound(format!("commit {sha}")))
    }

    async fn list_pull_requests(&self) -> Result<Vec<PullRequest>, PulseError> {
        Ok(self.pulls.clone())
    }

    async fn review_comments(&self, number: u64) -> Result<Vec<ReviewComment>, PulseError> {
        if self.unreadable_pulls.contains(&number) {
            return Err(PulseError::Api(format!(
                "failed to fetch review comments of #{number}"
            )));
        }
        self.comments
            .get(&number)
            .cloned()
            .ok_or_else(|| PulseError::NotFound(format!("pull request #{number}")))
    }

    async fn list_contributors(&self) -> Result<Vec<Contributor>, PulseError> {
        Ok(self.contributors.clone())
    }
}
