//! Commit grouping by author login.

use std::collections::BTreeMap;

use ghpulse_core::{Commit, ProgressObserver};

use crate::progress::Tracker;

/// Commits keyed by author login.
///
/// # Examples
///
/// ```
/// use ghpulse_core::Commit;
/// use ghpulse_stats::grouping::group_by_author;
///
/// let commits = vec![
///     Commit { sha: "1".into(), author: Some("alice".into()), date: None },
///     Commit { sha: "2".into(), author: None, date: None },
///     Commit { sha: "3".into(), author: Some("alice".into()), date: None },
/// ];
/// let grouped = group_by_author(&commits, None);
/// assert_eq!(grouped.commits_of("alice").len(), 2);
/// assert!(grouped.commits_of("bob").is_empty());
/// assert_eq!(grouped.unattributed(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommitsByAuthor {
    groups: BTreeMap<String, Vec<Commit>>,
    unattributed: usize,
}

impl CommitsByAuthor {
    /// Commits authored by `login`, in input order; empty if none.
    pub fn commits_of(&self, login: &str) -> &[Commit] {
        self.groups.get(login).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Logins with at least one commit, sorted.
    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of distinct authors.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no commit carried an author.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Commits that were left out because they have no platform author.
    pub fn unattributed(&self) -> usize {
        self.unattributed
    }
}

/// Group `commits` by author login.
///
/// Commits without a platform author are left out and counted. `progress`
/// receives the completed fraction after every commit.
pub fn group_by_author(
    commits: &[Commit],
    progress: Option<&dyn ProgressObserver>,
) -> CommitsByAuthor {
    let mut tracker = Tracker::new(progress, commits.len());
    let mut grouped = CommitsByAuthor::default();

    for commit in commits {
        match &commit.author {
            Some(login) => grouped
                .groups
                .entry(login.clone())
                .or_default()
                .push(commit.clone()),
            None => {
                tracing::debug!(sha = commit.short_sha(), "commit has no platform author");
                grouped.unattributed += 1;
            }
        }
        tracker.advance();
    }

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(sha: &str, author: Option<&str>) -> Commit {
        Commit {
            sha: sha.into(),
            author: author.map(Into::into),
            date: None,
        }
    }

    #[test]
    fn groups_preserve_input_order() {
        let commits = vec![
            commit("1", Some("bob")),
            commit("2", Some("alice")),
            commit("3", Some("bob")),
        ];
        let grouped = group_by_author(&commits, None);

        let shas: Vec<&str> = grouped
            .commits_of("bob")
            .iter()
            .map(|c| c.sha.as_str())
            .collect();
        assert_eq!(shas, vec!["1", "3"]);
        assert_eq!(grouped.authors().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn unattributed_commits_are_counted_not_grouped() {
        let commits = vec![commit("1", None), commit("2", None)];
        let grouped = group_by_author(&commits, None);
        assert!(grouped.is_empty());
        assert_eq!(grouped.unattributed(), 2);
    }

    #[test]
    fn progress_covers_every_commit() {
        let commits = vec![commit("1", Some("a")), commit("2", None)];
        let seen = std::cell::RefCell::new(Vec::new());
        let observer = |f: f64| seen.borrow_mut().push(f);
        group_by_author(&commits, Some(&observer));
        assert_eq!(*seen.borrow(), vec![0.5, 1.0]);
    }
}
