use std::fmt::Display;

use ghpulse_core::{
    Commit, Contributor, Credential, FileChange, GitHubConfig, PulseError, PullRequest, RepoId,
    RepositoryInfo, RepositorySource, ReviewComment,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::wire::{
    WireCommit, WireCommitDetail, WireContributor, WirePull, WireRepository, WireReviewComment,
};

/// GitHub REST client used to resolve repositories.
///
/// # Examples
///
/// ```no_run
/// use ghpulse_core::{Credential, GitHubConfig};
/// use ghpulse_github::GitHubClient;
///
/// let credential = Credential::from_env("GITHUB_TOKEN").unwrap();
/// let client = GitHubClient::new(&credential, &GitHubConfig::default()).unwrap();
/// ```
#[derive(Clone)]
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    per_page: u8,
}

#[derive(Serialize)]
struct PageParams<'a> {
    per_page: u8,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
}

impl GitHubClient {
    /// Create a client authenticated with `credential`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Config`] if the API URL is invalid, or
    /// [`PulseError::Api`] if the client cannot be built.
    pub fn new(credential: &Credential, config: &GitHubConfig) -> Result<Self, PulseError> {
        let octocrab = octocrab::Octocrab::builder()
            .personal_token(credential.expose().to_string())
            .base_uri(config.api_url.as_str())
            .map_err(|e| PulseError::Config(format!("invalid api_url '{}': {e}", config.api_url)))?
            .build()
            .map_err(|e| PulseError::Api(format!("failed to create GitHub client: {e}")))?;

        Ok(Self {
            octocrab,
            per_page: config.per_page,
        })
    }

    /// Resolve `repo`, distinguishing a missing repository from other failures.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::RepositoryNotFound`] on 404, or
    /// [`PulseError::Api`] on any other network or API error.
    pub async fn repository(&self, repo: &RepoId) -> Result<RemoteRepository, PulseError> {
        let route = format!("/repos/{}/{}", repo.owner, repo.name);
        let wire: WireRepository = self
            .octocrab
            .get(&route, None::<&()>)
            .await
            .map_err(|e| match status_of(&e) {
                Some(404) => PulseError::RepositoryNotFound {
                    repo: repo.to_string(),
                },
                _ => PulseError::Api(format!("failed to access repository {repo}: {e}")),
            })?;

        let info = RepositoryInfo::from(wire);
        tracing::debug!(repo = %repo, full_name = %info.full_name, "repository resolved");

        Ok(RemoteRepository {
            client: self.clone(),
            id: repo.clone(),
            info,
        })
    }

    /// Fetch every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        route: &str,
        state: Option<&str>,
    ) -> Result<Vec<T>, octocrab::Error> {
        let mut items = Vec::new();
        let mut page = 1u32;
        loop {
            let params = PageParams {
                per_page: self.per_page,
                page,
                state,
            };
            let batch: Vec<T> = self.octocrab.get(route, Some(&params)).await?;
            let fetched = batch.len();
            items.extend(batch);
            tracing::debug!(route, page, fetched, "fetched page");
            if fetched < usize::from(self.per_page) {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

/// A resolved repository; implements [`RepositorySource`].
#[derive(Clone)]
pub struct RemoteRepository {
    client: GitHubClient,
    id: RepoId,
    info: RepositoryInfo,
}

impl RemoteRepository {
    /// The `owner/name` this handle was resolved from.
    pub fn id(&self) -> &RepoId {
        &self.id
    }

    /// Metadata reported by the platform.
    pub fn info(&self) -> &RepositoryInfo {
        &self.info
    }

    fn route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}{suffix}", self.id.owner, self.id.name)
    }
}

impl RepositorySource for RemoteRepository {
    async fn list_commits(&self) -> Result<Vec<Commit>, PulseError> {
        let route = self.route("/commits");
        match self.client.get_all::<WireCommit>(&route, None).await {
            Ok(commits) => Ok(commits.into_iter().map(Commit::from).collect()),
            // An empty repository answers 409 "Git Repository is empty."
            Err(e) if status_of(&e) == Some(409) => Ok(Vec::new()),
            Err(e) => Err(api_error(e, format!("commits of {}", self.id))),
        }
    }

    async fn commit_files(&self, sha: &str) -> Result<Vec<FileChange>, PulseError> {
        let route = self.route(&format!("/commits/{sha}"));
        let per_page = self.client.per_page;
        let mut changes = Vec::new();
        let mut page = 1u32;
        // Large commits split their file list across pages of the detail endpoint.
        loop {
            let params = PageParams {
                per_page,
                page,
                state: None,
            };
            let detail: WireCommitDetail = self
                .client
                .octocrab
                .get(&route, Some(&params))
                .await
                .map_err(|e| api_error(e, format!("commit {sha}")))?;
            let batch = detail.into_changes();
            let fetched = batch.len();
            changes.extend(batch);
            if fetched < usize::from(per_page) {
                break;
            }
            page += 1;
        }
        Ok(changes)
    }

    async fn list_pull_requests(&self) -> Result<Vec<PullRequest>, PulseError> {
        let route = self.route("/pulls");
        let pulls = self
            .client
            .get_all::<WirePull>(&route, Some("all"))
            .await
            .map_err(|e| api_error(e, format!("pull requests of {}", self.id)))?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    async fn review_comments(&self, number: u64) -> Result<Vec<ReviewComment>, PulseError> {
        let route = self.route(&format!("/pulls/{number}/comments"));
        let comments = self
            .client
            .get_all::<WireReviewComment>(&route, None)
            .await
            .map_err(|e| api_error(e, format!("review comments of #{number}")))?;
        Ok(comments.into_iter().map(ReviewComment::from).collect())
    }

    async fn list_contributors(&self) -> Result<Vec<Contributor>, PulseError> {
        let route = self.route("/contributors");
        let contributors = self
            .client
            .get_all::<WireContributor>(&route, None)
            .await
            .map_err(|e| api_error(e, format!("contributors of {}", self.id)))?;
        Ok(contributors
            .into_iter()
            .filter_map(WireContributor::into_contributor)
            .collect())
    }
}

/// HTTP status of a GitHub API error, if the failure came from the API.
fn status_of(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

fn api_error(err: octocrab::Error, what: impl Display) -> PulseError {
    match status_of(&err) {
        Some(404) => PulseError::NotFound(what.to_string()),
        _ => PulseError::Api(format!("failed to fetch {what}: {err}")),
    }
}
