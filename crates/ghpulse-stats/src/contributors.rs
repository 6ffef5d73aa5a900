//! File→contributors aggregation.
//!
//! Walks a commit list, looks up the files each attributed commit touched,
//! and records which logins modified which files.

use std::collections::{BTreeMap, BTreeSet};

use futures_util::stream::{self, StreamExt};
use ghpulse_core::{Commit, ItemKind, ProgressObserver, RepositorySource, SkippedItem};
use serde::Serialize;

use crate::progress::Tracker;

/// Per-file set of logins that modified the file.
///
/// Logins are unique per file; insertion order is irrelevant.
///
/// # Examples
///
/// ```
/// use ghpulse_stats::contributors::ContributorFileMap;
///
/// let mut map = ContributorFileMap::new();
/// assert!(map.record("x.txt", "alice"));
/// assert!(!map.record("x.txt", "alice"));
/// assert!(map.record("x.txt", "bob"));
/// assert_eq!(map.contributors("x.txt").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContributorFileMap {
    files: BTreeMap<String, BTreeSet<String>>,
}

impl ContributorFileMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `login` modified `path`. Returns `false` if already recorded.
    pub fn record(&mut self, path: &str, login: &str) -> bool {
        self.files
            .entry(path.to_string())
            .or_default()
            .insert(login.to_string())
    }

    /// Logins that modified `path`, if any.
    pub fn contributors(&self, path: &str) -> Option<&BTreeSet<String>> {
        self.files.get(path)
    }

    /// Files and their contributor sets, ordered by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.files.iter().map(|(path, logins)| (path.as_str(), logins))
    }

    /// Number of files recorded.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file has been recorded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for ContributorFileMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (path, login) in iter {
            map.record(path, login);
        }
        map
    }
}

/// Result of [`build_file_map`].
#[derive(Debug, Clone, Default)]
pub struct FileMapOutcome {
    /// The aggregated map.
    pub map: ContributorFileMap,
    /// Commits without a platform author; no lookup was made for them.
    pub unattributed: usize,
    /// Commits whose file lookup failed.
    pub skipped: Vec<SkippedItem>,
}

/// Build the file→contributors map for `commits`.
///
/// Commits without an author are passed over. File lookups run with at most
/// `concurrency` requests in flight; a failed lookup is logged, recorded in
/// [`FileMapOutcome::skipped`], and the remaining commits are still processed.
/// `progress` receives the completed fraction after every commit.
///
/// # Examples
///
/// ```
/// use ghpulse_core::{Commit, FileChange, RepositorySource};
/// use ghpulse_stats::contributors::build_file_map;
/// use ghpulse_stats::memory::MemorySource;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let source = MemorySource::new().with_commit(
///     Commit { sha: "a1".into(), author: Some("alice".into()), date: None },
///     vec![FileChange { path: "x.txt".into(), lines_added: 5 }],
/// );
/// let commits = source.list_commits().await.unwrap();
/// let outcome = build_file_map(&source, &commits, 4, None).await;
/// assert!(outcome.map.contributors("x.txt").unwrap().contains("alice"));
/// # });
/// ```
pub async fn build_file_map<S: RepositorySource>(
    source: &S,
    commits: &[Commit],
    concurrency: usize,
    progress: Option<&dyn ProgressObserver>,
) -> FileMapOutcome {
    let mut tracker = Tracker::new(progress, commits.len());
    let mut outcome = FileMapOutcome::default();

    let mut attributed = Vec::with_capacity(commits.len());
    for commit in commits {
        match commit.author.as_deref() {
            Some(login) => attributed.push((commit, login)),
            None => {
                tracing::debug!(sha = commit.short_sha(), "commit has no platform author");
                outcome.unattributed += 1;
                tracker.advance();
            }
        }
    }

    let mut lookups = stream::iter(attributed)
        .map(|(commit, login)| async move { (commit, login, source.commit_files(&commit.sha).await) })
        .buffer_unordered(concurrency.max(1));

    while let Some((commit, login, result)) = lookups.next().await {
        match result {
            Ok(files) => {
                for file in &files {
                    outcome.map.record(&file.path, login);
                }
            }
            Err(e) => {
                tracing::warn!(sha = commit.short_sha(), error = %e, "skipping commit");
                outcome.skipped.push(SkippedItem::new(
                    ItemKind::Commit,
                    commit.short_sha(),
                    e.to_string(),
                ));
            }
        }
        tracker.advance();
    }

    outcome
}
