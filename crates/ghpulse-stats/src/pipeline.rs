//! End-to-end analyses over a [`RepositorySource`].

use std::fmt;

use chrono::{DateTime, Utc};
use ghpulse_core::{AnalysisConfig, ProgressObserver, PulseError, RepositorySource, SkippedItem};
use serde::Serialize;

use crate::contributors::build_file_map;
use crate::grouping::group_by_author;
use crate::pairs::{top_pairs, RankedPair};
use crate::progress::{Phase, Tracker};
use crate::weekly::{analyze_contributor, ContributorWeek, WeeklyWindow};

/// Share of weekly progress spent grouping commits; the contributor loop gets the rest.
pub const GROUPING_SHARE: f64 = 0.1;

/// Result of [`run_pair_analysis`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairReport {
    /// Commits listed on the default branch.
    pub commits_analyzed: usize,
    /// Commits without a platform author.
    pub unattributed_commits: usize,
    /// Distinct files touched by attributed commits.
    pub files: usize,
    /// Top pairs, most shared files first.
    pub pairs: Vec<RankedPair>,
    /// Items passed over because of per-item failures.
    pub skipped: Vec<SkippedItem>,
}

/// Result of [`run_weekly_analysis`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    /// The window the statistics cover.
    pub window: WeeklyWindow,
    /// Commits listed on the default branch.
    pub commits_analyzed: usize,
    /// One entry per contributor, in platform order.
    pub contributors: Vec<ContributorWeek>,
    /// Items passed over because of per-item failures.
    pub skipped: Vec<SkippedItem>,
}

impl fmt::Display for PairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Commits: {}", self.commits_analyzed)?;
        if self.pairs.is_empty() {
            return writeln!(f, "No contributors pairs found");
        }
        writeln!(f, "Top contributors pairs:")?;
        for ranked in &self.pairs {
            writeln!(f, "{ranked}")?;
        }
        Ok(())
    }
}

impl PairReport {
    /// Render the report as GitHub-flavored Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Top Contributor Pairs\n\n");
        out.push_str(&format!(
            "**Commits analyzed:** {} ({} files)\n\n",
            self.commits_analyzed, self.files
        ));

        if self.pairs.is_empty() {
            out.push_str("No contributors pairs found.\n");
            return out;
        }
        out.push_str("| Rank | Contributors | Shared files |\n");
        out.push_str("|------|--------------|--------------|\n");
        for (i, ranked) in self.pairs.iter().enumerate() {
            out.push_str(&format!(
                "| {} | `{}` | {} |\n",
                i + 1,
                ranked.pair,
                ranked.shared_files
            ));
        }
        out
    }
}

impl fmt::Display for WeeklyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Commits: {}", self.commits_analyzed)?;
        for week in &self.contributors {
            writeln!(f)?;
            writeln!(f, "Contributor: {}", week.login)?;
            writeln!(f, "Lines of code: {}", week.lines_added)?;
            writeln!(f, "Commits: {}", week.commits)?;
            writeln!(f, "Merge requests: {}", week.merge_requests)?;
            writeln!(f, "Max chars in comment: {}", week.max_comment_chars)?;
        }
        Ok(())
    }
}

impl WeeklyReport {
    /// Render the report as GitHub-flavored Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Weekly Contributions\n\n");
        out.push_str(&format!(
            "**Window:** {} to {}\n\n**Commits analyzed:** {}\n\n",
            self.window.cutoff.format("%Y-%m-%d %H:%M UTC"),
            self.window.now.format("%Y-%m-%d %H:%M UTC"),
            self.commits_analyzed
        ));

        if self.contributors.is_empty() {
            out.push_str("No contributors found.\n");
            return out;
        }
        out.push_str("| Contributor | Lines of code | Commits | Merge requests | Max chars in comment |\n");
        out.push_str("|-------------|---------------|---------|----------------|----------------------|\n");
        for week in &self.contributors {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                week.login, week.lines_added, week.commits, week.merge_requests, week.max_comment_chars
            ));
        }
        out
    }
}

/// Rank the contributor pairs that modified the same files.
///
/// Lists the commits, builds the file→contributors map, and keeps the top
/// `config.top_pairs` pairs.
///
/// # Errors
///
/// Returns the source's error if the commit list cannot be fetched. Per-commit
/// failures are reported in [`PairReport::skipped`] instead.
pub async fn run_pair_analysis<S: RepositorySource>(
    source: &S,
    config: &AnalysisConfig,
    progress: Option<&dyn ProgressObserver>,
) -> Result<PairReport, PulseError> {
    let commits = source.list_commits().await?;
    tracing::info!(commits = commits.len(), "listed commits");

    let outcome = build_file_map(source, &commits, config.concurrency, progress).await;
    let pairs = top_pairs(&outcome.map, config.top_pairs);

    Ok(PairReport {
        commits_analyzed: commits.len(),
        unattributed_commits: outcome.unattributed,
        files: outcome.map.len(),
        pairs,
        skipped: outcome.skipped,
    })
}

/// Compute every contributor's activity in the window ending at `now`.
///
/// Lists the commits and groups them by author, then lists contributors and
/// pull requests once and analyzes each contributor in platform order.
/// `progress` covers grouping (per commit, up to [`GROUPING_SHARE`]) and then
/// the contributor loop (per contributor, up to 1.0).
///
/// # Errors
///
/// Returns the source's error if commits, contributors, or pull requests
/// cannot be listed. Per-item failures are reported in
/// [`WeeklyReport::skipped`] instead.
pub async fn run_weekly_analysis<S: RepositorySource>(
    source: &S,
    now: DateTime<Utc>,
    config: &AnalysisConfig,
    progress: Option<&dyn ProgressObserver>,
) -> Result<WeeklyReport, PulseError> {
    let window = WeeklyWindow::ending_at(now, config.window_days)?;
    let commits = source.list_commits().await?;
    tracing::info!(commits = commits.len(), cutoff = %window.cutoff, "listed commits");

    let mut report = WeeklyReport {
        window,
        commits_analyzed: commits.len(),
        contributors: Vec::new(),
        skipped: Vec::new(),
    };
    // An empty repository has no contributors to report on.
    if commits.is_empty() {
        return Ok(report);
    }

    let grouping = progress.map(|observer| Phase::new(observer, 0.0, GROUPING_SHARE));
    let by_author = group_by_author(
        &commits,
        grouping.as_ref().map(|p| p as &dyn ProgressObserver),
    );
    let contributors = source.list_contributors().await?;
    let pulls = source.list_pull_requests().await?;
    tracing::info!(
        contributors = contributors.len(),
        pull_requests = pulls.len(),
        "listed contributors and pull requests"
    );

    let analyzing = progress.map(|observer| Phase::new(observer, GROUPING_SHARE, 1.0));
    let mut tracker = Tracker::new(
        analyzing.as_ref().map(|p| p as &dyn ProgressObserver),
        contributors.len(),
    );
    for contributor in &contributors {
        let week = analyze_contributor(
            source,
            &contributor.login,
            &window,
            by_author.commits_of(&contributor.login),
            &pulls,
            config.concurrency,
            &mut report.skipped,
        )
        .await;
        report.contributors.push(week);
        tracker.advance();
    }

    Ok(report)
}
