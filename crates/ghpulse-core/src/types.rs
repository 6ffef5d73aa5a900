use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PulseError;

/// A repository reference of the form `owner/name`.
///
/// # Examples
///
/// ```
/// use ghpulse_core::RepoId;
///
/// let repo: RepoId = "rust-lang/cargo".parse().unwrap();
/// assert_eq!(repo.owner, "rust-lang");
/// assert_eq!(repo.name, "cargo");
/// assert_eq!(repo.to_string(), "rust-lang/cargo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    /// Account or organization owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoId {
    /// Build a reference from already separated parts.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::InvalidRepo`] if either part is empty or contains `/`.
    pub fn new(owner: &str, name: &str) -> Result<Self, PulseError> {
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            return Err(PulseError::InvalidRepo(format!("{owner}/{name}")));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((owner, name)) = s.trim().split_once('/') else {
            return Err(PulseError::InvalidRepo(s.to_string()));
        };
        Self::new(owner, name)
    }
}

/// Repository metadata returned when a repository is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    /// `owner/name` as reported by the platform.
    pub full_name: String,
    /// Short description, when set.
    pub description: Option<String>,
}

/// A commit as listed by the platform.
///
/// The changed files are not part of the listing; they are fetched per
/// commit through [`crate::RepositorySource::commit_files`].
///
/// # Examples
///
/// ```
/// use ghpulse_core::Commit;
///
/// let commit = Commit {
///     sha: "3f2a9c1".into(),
///     author: Some("alice".into()),
///     date: None,
/// };
/// assert_eq!(commit.author.as_deref(), Some("alice"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Full commit SHA.
    pub sha: String,
    /// Login of the platform account attributed as author, if any.
    pub author: Option<String>,
    /// Commit date (committer date, falling back to author date).
    pub date: Option<DateTime<Utc>>,
}

impl Commit {
    /// First seven characters of the SHA, for display.
    pub fn short_sha(&self) -> &str {
        match self.sha.char_indices().nth(7) {
            Some((end, _)) => &self.sha[..end],
            None => &self.sha,
        }
    }
}

/// A single file touched by a commit.
///
/// # Examples
///
/// ```
/// use ghpulse_core::FileChange;
///
/// let change = FileChange { path: "src/main.rs".into(), lines_added: 12 };
/// assert_eq!(change.lines_added, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// File path relative to the repository root.
    pub path: String,
    /// Lines added to this file by the commit.
    pub lines_added: u64,
}

/// Platform state of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
    /// Still open.
    Open,
    /// Closed without merging.
    Closed,
    /// Closed by merging.
    Merged,
}

impl fmt::Display for PullState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullState::Open => write!(f, "open"),
            PullState::Closed => write!(f, "closed"),
            PullState::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request, in any state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    /// Pull request number within the repository.
    pub number: u64,
    /// Login of the author, if the account still exists.
    pub author: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Current state.
    pub state: PullState,
}

/// A review comment left on a pull request diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    /// Comment id.
    pub id: u64,
    /// Login of the commenter, if any.
    pub author: Option<String>,
    /// Markdown body.
    pub body: String,
}

impl ReviewComment {
    /// Body length in Unicode scalar values.
    ///
    /// # Examples
    ///
    /// ```
    /// use ghpulse_core::ReviewComment;
    ///
    /// let c = ReviewComment { id: 1, author: None, body: "naïve".into() };
    /// assert_eq!(c.body_chars(), 5);
    /// ```
    pub fn body_chars(&self) -> usize {
        self.body.chars().count()
    }
}

/// A repository contributor as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// Account login.
    pub login: String,
    /// Number of contributions the platform attributes to this account.
    pub contributions: u64,
}

/// Kind of remote item that was skipped during an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    /// A commit (missing author, missing date, or failed file lookup).
    Commit,
    /// A pull request whose review comments could not be fetched.
    PullRequest,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Commit => write!(f, "commit"),
            ItemKind::PullRequest => write!(f, "pull request"),
        }
    }
}

/// A per-item failure that was logged and passed over.
///
/// # Examples
///
/// ```
/// use ghpulse_core::{ItemKind, SkippedItem};
///
/// let item = SkippedItem::new(ItemKind::Commit, "3f2a9c1", "not found");
/// assert_eq!(item.to_string(), "commit 3f2a9c1: not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    /// What was skipped.
    pub kind: ItemKind,
    /// Identifier of the item (short SHA or `#number`).
    pub id: String,
    /// Why it was skipped.
    pub reason: String,
}

impl SkippedItem {
    /// Record a skipped item.
    pub fn new(kind: ItemKind, id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.id, self.reason)
    }
}

/// Output format for CLI results.
///
/// # Examples
///
/// ```
/// use ghpulse_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines, as printed by the interactive session.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown tables.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_id_parses_owner_and_name() {
        let repo: RepoId = " octocat/hello-world ".parse().unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.name, "hello-world");
    }

    #[test]
    fn repo_id_rejects_malformed_input() {
        assert!("octocat".parse::<RepoId>().is_err());
        assert!("/hello".parse::<RepoId>().is_err());
        assert!("octocat/".parse::<RepoId>().is_err());
        assert!("a/b/c".parse::<RepoId>().is_err());
        assert!(RepoId::new("", "x").is_err());
    }

    #[test]
    fn short_sha_handles_short_input() {
        let commit = Commit {
            sha: "abc".into(),
            author: None,
            date: None,
        };
        assert_eq!(commit.short_sha(), "abc");

        let commit = Commit {
            sha: "0123456789abcdef".into(),
            author: None,
            date: None,
        };
        assert_eq!(commit.short_sha(), "0123456");
    }

    #[test]
    fn short_sha_cuts_at_char_boundary() {
        let commit = Commit {
            sha: "日本語日本語日本語".into(),
            author: None,
            date: None,
        };
        assert_eq!(commit.short_sha(), "日本語日本語日");
    }

    #[test]
    fn body_chars_counts_scalars_not_bytes() {
        let comment = ReviewComment {
            id: 7,
            author: Some("bob".into()),
            body: "日本語".into(),
        };
        assert_eq!(comment.body_chars(), 3);
        assert_eq!(comment.body.len(), 9);
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn pull_state_serializes_lowercase() {
        let json = serde_json::to_string(&PullState::Merged).unwrap();
        assert_eq!(json, "\"merged\"");
    }
}
