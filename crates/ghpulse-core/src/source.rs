use std::future::Future;

use crate::error::PulseError;
use crate::types::{Commit, Contributor, FileChange, PullRequest, ReviewComment};

/// Remote operations the analyses consume, scoped to one resolved repository.
///
/// `ghpulse-github` implements this over the GitHub REST API; tests use
/// in-memory implementations.
///
/// Per-item lookups ([`commit_files`](Self::commit_files),
/// [`review_comments`](Self::review_comments)) may fail independently; callers
/// skip the item and continue. Listing failures abort the analysis.
pub trait RepositorySource {
    /// All commits reachable from the default branch, newest first.
    fn list_commits(&self) -> impl Future<Output = Result<Vec<Commit>, PulseError>> + Send;

    /// Files changed by the commit `sha`, with lines added per file.
    fn commit_files(
        &self,
        sha: &str,
    ) -> impl Future<Output = Result<Vec<FileChange>, PulseError>> + Send;

    /// Pull requests in every state (open, closed, merged).
    fn list_pull_requests(
        &self,
    ) -> impl Future<Output = Result<Vec<PullRequest>, PulseError>> + Send;

    /// Review comments left on pull request `number`.
    fn review_comments(
        &self,
        number: u64,
    ) -> impl Future<Output = Result<Vec<ReviewComment>, PulseError>> + Send;

    /// Contributors in platform order (most contributions first).
    fn list_contributors(
        &self,
    ) -> impl Future<Output = Result<Vec<Contributor>, PulseError>> + Send;
}

/// Receives completion fractions in `[0.0, 1.0]` while an analysis runs.
///
/// Implemented for any `Fn(f64)`, so a closure can be passed directly.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use ghpulse_core::ProgressObserver;
///
/// let last = Cell::new(0.0);
/// let observer = |fraction: f64| last.set(fraction);
/// observer.report(0.5);
/// assert_eq!(last.get(), 0.5);
/// ```
pub trait ProgressObserver {
    /// Called with the fraction of work completed so far.
    fn report(&self, fraction: f64);
}

impl<F> ProgressObserver for F
where
    F: Fn(f64),
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}
