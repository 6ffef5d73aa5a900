//! Response shapes for the REST endpoints ghpulse reads.
//!
//! Only the fields the analyses need are declared; everything else in the
//! payload is ignored.

use chrono::{DateTime, Utc};
use ghpulse_core::{
    Commit, Contributor, FileChange, PullRequest, PullState, RepositoryInfo, ReviewComment,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    #[serde(default)]
    login: Option<String>,
}

fn login_of(user: Option<WireUser>) -> Option<String> {
    user.and_then(|u| u.login).filter(|l| !l.is_empty())
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRepository {
    full_name: String,
    #[serde(default)]
    description: Option<String>,
}

impl From<WireRepository> for RepositoryInfo {
    fn from(repo: WireRepository) -> Self {
        Self {
            full_name: repo.full_name,
            description: repo.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireSignature {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct WireGitCommit {
    #[serde(default)]
    author: Option<WireSignature>,
    #[serde(default)]
    committer: Option<WireSignature>,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Deserialize)]
pub(crate) struct WireCommit {
    sha: String,
    #[serde(default)]
    author: Option<WireUser>,
    commit: WireGitCommit,
}

impl From<WireCommit> for Commit {
    fn from(entry: WireCommit) -> Self {
        let committed = entry.commit.committer.and_then(|s| s.date);
        let authored = entry.commit.author.and_then(|s| s.date);
        Self {
            sha: entry.sha,
            author: login_of(entry.author),
            date: committed.or(authored),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireFile {
    filename: String,
    #[serde(default)]
    additions: u64,
}

/// Body of `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Deserialize)]
pub(crate) struct WireCommitDetail {
    #[serde(default)]
    files: Vec<WireFile>,
}

impl WireCommitDetail {
    pub(crate) fn into_changes(self) -> Vec<FileChange> {
        self.files
            .into_iter()
            .map(|f| FileChange {
                path: f.filename,
                lines_added: f.additions,
            })
            .collect()
    }
}

/// Entry of `GET /repos/{owner}/{repo}/pulls?state=all`.
#[derive(Debug, Deserialize)]
pub(crate) struct WirePull {
    number: u64,
    #[serde(default)]
    user: Option<WireUser>,
    created_at: DateTime<Utc>,
    state: String,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
}

impl From<WirePull> for PullRequest {
    fn from(pull: WirePull) -> Self {
        let state = if pull.merged_at.is_some() {
            PullState::Merged
        } else if pull.state == "open" {
            PullState::Open
        } else {
            PullState::Closed
        };
        Self {
            number: pull.number,
            author: login_of(pull.user),
            created_at: pull.created_at,
            state,
        }
    }
}

/// Entry of `GET /repos/{owner}/{repo}/pulls/{number}/comments`.
#[derive(Debug, Deserialize)]
pub(crate) struct WireReviewComment {
    id: u64,
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    body: String,
}

impl From<WireReviewComment> for ReviewComment {
    fn from(comment: WireReviewComment) -> Self {
        Self {
            id: comment.id,
            author: login_of(comment.user),
            body: comment.body,
        }
    }
}

/// Entry of `GET /repos/{owner}/{repo}/contributors`.
#[derive(Debug, Deserialize)]
pub(crate) struct WireContributor {
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    contributions: u64,
}

impl WireContributor {
    /// Anonymous contributors carry no login and are dropped.
    pub(crate) fn into_contributor(self) -> Option<Contributor> {
        let login = self.login.filter(|l| !l.is_empty())?;
        Some(Contributor {
            login,
            contributions: self.contributions,
        })
    }
}
