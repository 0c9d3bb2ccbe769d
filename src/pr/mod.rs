pub mod types;
pub mod window;

pub use types::{PullRequest, RepoCoordinate};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use types::PullResponse;

/// Public GitHub REST API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Single page, no further pagination.
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GITHUB_TOKEN not found")]
    MissingToken,
}

/// Anything that can list a repository's closed pull requests, most
/// recently updated first.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn closed_pull_requests(&self) -> Result<Vec<PullRequest>, PrError>;
}

/// Fetches pull requests from the GitHub REST API.
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
    repo: RepoCoordinate,
    token: String,
}

impl GitHubClient {
    /// Fails with [`PrError::MissingToken`] before any request is made when
    /// no credential was injected.
    pub fn new(
        repo: RepoCoordinate,
        token: Option<&str>,
        api_url: Option<&str>,
    ) -> Result<Self, PrError> {
        let token = token.ok_or(PrError::MissingToken)?.to_string();
        let api_url = api_url
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client: reqwest::Client::new(),
            api_url,
            repo,
            token,
        })
    }

    fn pulls_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/pulls",
            self.api_url, self.repo.owner, self.repo.name
        )
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn closed_pull_requests(&self) -> Result<Vec<PullRequest>, PrError> {
        let per_page = PAGE_SIZE.to_string();
        debug!(url = %self.pulls_url(), "listing closed pull requests");
        let response = self
            .client
            .get(self.pulls_url())
            .query(&[
                ("state", "closed"),
                ("sort", "updated"),
                ("direction", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .header("User-Agent", "pr-timesheet")
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;

        let pulls = response.json::<Vec<PullResponse>>().await?;
        debug!(count = pulls.len(), "received pull requests");

        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }
}
