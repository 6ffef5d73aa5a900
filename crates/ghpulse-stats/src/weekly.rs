//! Per-contributor activity inside a trailing time window.
//!
//! For one contributor this reports lines added and commits made after the
//! window cutoff, the pull requests they opened in that time (any state), and
//! the longest review comment left on those pull requests.

use chrono::{DateTime, Duration, Utc};
use futures_util::stream::{self, StreamExt};
use ghpulse_core::{
    Commit, ItemKind, PulseError, PullRequest, RepositorySource, ReviewComment, SkippedItem,
};
use serde::Serialize;

/// The trailing window `(cutoff, now]`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use ghpulse_stats::weekly::WeeklyWindow;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
/// let window = WeeklyWindow::ending_at(now, 7).unwrap();
/// assert_eq!(window.cutoff, now - Duration::days(7));
/// assert!(window.contains(now - Duration::days(1)));
/// assert!(!window.contains(window.cutoff));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWindow {
    /// Start of the window, exclusive.
    pub cutoff: DateTime<Utc>,
    /// Instant the window was computed at.
    pub now: DateTime<Utc>,
}

impl WeeklyWindow {
    /// The `days`-long window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Config`] if the cutoff falls outside the
    /// representable date range.
    pub fn ending_at(now: DateTime<Utc>, days: u32) -> Result<Self, PulseError> {
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| {
                PulseError::Config(format!("a {days}-day window ending at {now} is out of range"))
            })?;
        Ok(Self { cutoff, now })
    }

    /// Whether `at` is strictly after the cutoff.
    ///
    /// Timestamps after `now` (clock skew between platform and host) still count.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at > self.cutoff
    }
}

/// Activity of one contributor inside a [`WeeklyWindow`].
///
/// # Examples
///
/// ```
/// use ghpulse_stats::weekly::ContributorWeek;
///
/// let week = ContributorWeek::empty("alice");
/// assert_eq!(week.lines_added, 0);
/// assert_eq!(week.max_comment_chars, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorWeek {
    /// Contributor login.
    pub login: String,
    /// Lines added across the commits in the window.
    pub lines_added: u64,
    /// Commits in the window.
    pub commits: usize,
    /// Pull requests opened in the window, in any state.
    pub merge_requests: usize,
    /// Longest review comment on those pull requests, in characters.
    pub max_comment_chars: usize,
}

impl ContributorWeek {
    /// No activity for `login`.
    pub fn empty(login: &str) -> Self {
        Self {
            login: login.to_string(),
            lines_added: 0,
            commits: 0,
            merge_requests: 0,
            max_comment_chars: 0,
        }
    }
}

/// Commits dated inside `window`.
///
/// Commits without a date cannot be placed in the window; they are logged,
/// recorded in `skipped`, and left out.
pub fn commits_in_window<'a>(
    commits: &'a [Commit],
    window: &WeeklyWindow,
    skipped: &mut Vec<SkippedItem>,
) -> Vec<&'a Commit> {
    let mut inside = Vec::new();
    for commit in commits {
        match commit.date {
            Some(date) if window.contains(date) => inside.push(commit),
            Some(_) => {}
            None => {
                tracing::warn!(sha = commit.short_sha(), "skipping commit without a date");
                skipped.push(SkippedItem::new(
                    ItemKind::Commit,
                    commit.short_sha(),
                    "commit has no date",
                ));
            }
        }
    }
    inside
}

/// Pull requests authored by `login` and created inside `window`.
pub fn pulls_in_window<'a>(
    login: &str,
    pulls: &'a [PullRequest],
    window: &WeeklyWindow,
) -> Vec<&'a PullRequest> {
    pulls
        .iter()
        .filter(|pr| pr.author.as_deref() == Some(login) && window.contains(pr.created_at))
        .collect()
}

/// Length of the longest comment body in characters; 0 when there are none.
pub fn longest_comment(comments: &[ReviewComment]) -> usize {
    comments
        .iter()
        .map(ReviewComment::body_chars)
        .max()
        .unwrap_or(0)
}

/// Compute the activity of `login` inside `window`.
///
/// `commits` are the contributor's commits (see
/// [`crate::grouping::group_by_author`]); `pulls` are all pull requests of the
/// repository. File and review-comment lookups run with at most `concurrency`
/// requests in flight. A failed lookup is logged and recorded in `skipped`:
/// the commit still counts toward [`ContributorWeek::commits`] and the pull
/// request toward [`ContributorWeek::merge_requests`], but their lines or
/// comments are missing from the totals.
pub async fn analyze_contributor<S: RepositorySource>(
    source: &S,
    login: &str,
    window: &WeeklyWindow,
    commits: &[Commit],
    pulls: &[PullRequest],
    concurrency: usize,
    skipped: &mut Vec<SkippedItem>,
) -> ContributorWeek {
    let mut week = ContributorWeek::empty(login);
    let concurrency = concurrency.max(1);

    let recent = commits_in_window(commits, window, skipped);
    week.commits = recent.len();

    let mut lookups = stream::iter(recent)
        .map(|commit| async move { (commit, source.commit_files(&commit.sha).await) })
        .buffer_unordered(concurrency);
    while let Some((commit, result)) = lookups.next().await {
        match result {
            Ok(files) => week.lines_added += files.iter().map(|f| f.lines_added).sum::<u64>(),
            Err(e) => {
                tracing::warn!(sha = commit.short_sha(), error = %e, "skipping commit lines");
                skipped.push(SkippedItem::new(
                    ItemKind::Commit,
                    commit.short_sha(),
                    e.to_string(),
                ));
            }
        }
    }

    let opened = pulls_in_window(login, pulls, window);
    week.merge_requests = opened.len();

    let mut lookups = stream::iter(opened)
        .map(|pr| async move { (pr, source.review_comments(pr.number).await) })
        .buffer_unordered(concurrency);
    while let Some((pr, result)) = lookups.next().await {
        match result {
            Ok(comments) => {
                week.max_comment_chars = week.max_comment_chars.max(longest_comment(&comments));
            }
            Err(e) => {
                tracing::warn!(number = pr.number, error = %e, "skipping review comments");
                skipped.push(SkippedItem::new(
                    ItemKind::PullRequest,
                    format!("#{}", pr.number),
                    e.to_string(),
                ));
            }
        }
    }

    tracing::debug!(
        login,
        lines_added = week.lines_added,
        commits = week.commits,
        merge_requests = week.merge_requests,
        "contributor analyzed"
    );

    week
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ghpulse_core::{FileChange, PullState};

    use super::*;
    use crate::memory::MemorySource;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    fn commit(sha: &str, login: &str, date: Option<DateTime<Utc>>) -> Commit {
        Commit {
            sha: sha.into(),
            author: Some(login.into()),
            date,
        }
    }

    fn files(added: &[u64]) -> Vec<FileChange> {
        added
            .iter()
            .enumerate()
            .map(|(i, &n)| FileChange {
                path: format!("f{i}.rs"),
                lines_added: n,
            })
            .collect()
    }

    fn pull(number: u64, login: &str, created: DateTime<Utc>, state: PullState) -> PullRequest {
        PullRequest {
            number,
            author: Some(login.into()),
            created_at: created,
            state,
        }
    }

    fn comment(id: u64, body: &str) -> ReviewComment {
        ReviewComment {
            id,
            author: Some("reviewer".into()),
            body: body.into(),
        }
    }

    #[test]
    fn window_out_of_date_range_is_an_error() {
        let err = WeeklyWindow::ending_at(now(), u32::MAX).unwrap_err();
        assert!(matches!(err, PulseError::Config(_)));

        let earliest = DateTime::<Utc>::MIN_UTC + Duration::days(1);
        assert!(WeeklyWindow::ending_at(earliest, 7).is_err());
        assert!(WeeklyWindow::ending_at(now(), 36_500).is_ok());
    }

    #[test]
    fn window_excludes_cutoff_instant() {
        let window = WeeklyWindow::ending_at(now(), 7).unwrap();
        assert!(!window.contains(days_ago(7)));
        assert!(window.contains(days_ago(7) + Duration::seconds(1)));
        assert!(window.contains(now() + Duration::hours(1)));
    }

    #[test]
    fn undated_commits_are_skipped() {
        let window = WeeklyWindow::ending_at(now(), 7).unwrap();
        let commits = vec![
            commit("a1", "alice", Some(days_ago(1))),
            commit("a2", "alice", None),
            commit("a3", "alice", Some(days_ago(30))),
        ];
        let mut skipped = Vec::new();
        let inside = commits_in_window(&commits, &window, &mut skipped);
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].sha, "a1");
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].id, "a2");
    }

    #[test]
    fn pulls_are_filtered_by_author_and_date_across_states() {
        let window = WeeklyWindow::ending_at(now(), 7).unwrap();
        let pulls = vec![
            pull(1, "alice", days_ago(1), PullState::Open),
            pull(2, "alice", days_ago(2), PullState::Closed),
            pull(3, "alice", days_ago(3), PullState::Merged),
            pull(4, "alice", days_ago(10), PullState::Merged),
            pull(5, "bob", days_ago(1), PullState::Open),
        ];
        let numbers: Vec<u64> = pulls_in_window("alice", &pulls, &window)
            .iter()
            .map(|p| p.number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn longest_comment_is_zero_without_comments() {
        assert_eq!(longest_comment(&[]), 0);
        assert_eq!(
            longest_comment(&[comment(1, "short"), comment(2, "a bit longer")]),
            12
        );
    }

    #[tokio::test]
    async fn lines_sum_only_commits_after_cutoff() {
        let window = WeeklyWindow::ending_at(now(), 7).unwrap();
        let source = MemorySource::new()
            .with_commit(commit("a1", "alice", Some(days_ago(1))), files(&[5, 10]))
            .with_commit(commit("a2", "alice", Some(days_ago(6))), files(&[3]))
            .with_commit(commit("a3", "alice", Some(days_ago(8))), files(&[100]));
        let commits = source.list_commits().await.unwrap();

        let mut skipped = Vec::new();
        let week =
            analyze_contributor(&source, "alice", &window, &commits, &[], 4, &mut skipped).await;

        assert_eq!(week.lines_added, 18);
        assert_eq!(week.commits, 2);
        assert_eq!(week.merge_requests, 0);
        assert_eq!(week.max_comment_chars, 0);
        assert!(skipped.is_empty());
    }

    #[tokio::test]
    async fn comments_are_measured_on_recent_pulls_only() {
        let window = WeeklyWindow::ending_at(now(), 7).unwrap();
        let source = MemorySource::new()
            .with_pull(
                pull(1, "alice", days_ago(2), PullState::Merged),
                vec![comment(1, "ok"), comment(2, "please rename this")],
            )
            .with_pull(
                pull(2, "alice", days_ago(20), PullState::Closed),
                vec![comment(3, &"x".repeat(500))],
            );
        let pulls = source.list_pull_requests().await.unwrap();

        let mut skipped = Vec::new();
        let week =
            analyze_contributor(&source, "alice", &window, &[], &pulls, 4, &mut skipped).await;

        assert_eq!(week.merge_requests, 1);
        assert_eq!(week.max_comment_chars, "please rename this".len());
    }

    #[tokio::test]
    async fn failed_lookups_are_skipped_but_still_counted() {
        let window = WeeklyWindow::ending_at(now(), 7).unwrap();
        let source = MemorySource::new()
            .with_commit(commit("a1", "alice", Some(days_ago(1))), files(&[7]))
            .with_unreadable_commit(commit("a2", "alice", Some(days_ago(2))))
            .with_unreadable_pull(pull(9, "alice", days_ago(1), PullState::Open));
        let commits = source.list_commits().await.unwrap();
        let pulls = source.list_pull_requests().await.unwrap();

        let mut skipped = Vec::new();
        let week =
            analyze_contributor(&source, "alice", &window, &commits, &pulls, 2, &mut skipped).await;

        assert_eq!(week.lines_added, 7);
        assert_eq!(week.commits, 2);
        assert_eq!(week.merge_requests, 1);
        assert_eq!(week.max_comment_chars, 0);
        assert_eq!(skipped.len(), 2);
        assert!(skipped.iter().any(|s| s.kind == ItemKind::PullRequest && s.id == "#9"));
    }
}
