use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A closed pull request as seen by the timesheet.
/// Built from [`PullResponse`]; only the fields the aggregation reads.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    /// PR number (e.g., 42)
    pub number: u64,
    /// Author's GitHub login
    pub author: String,
    /// When the PR was merged. None means it was closed without merging.
    pub merged_at: Option<DateTime<Utc>>,
    /// Description text, if the author wrote one
    pub body: Option<String>,
}

/// Login used when GitHub reports no user (deleted accounts).
pub const GHOST_AUTHOR: &str = "ghost";

/// One element of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub struct PullResponse {
    pub number: u64,
    pub user: Option<User>,
    pub merged_at: Option<DateTime<Utc>>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub login: String,
}

impl From<PullResponse> for PullRequest {
    fn from(response: PullResponse) -> Self {
        PullRequest {
            number: response.number,
            author: response
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| GHOST_AUTHOR.to_string()),
            merged_at: response.merged_at,
            body: response.body,
        }
    }
}

/// A repository on the hosting platform, e.g. `octo/widgets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinate {
    pub owner: String,
    pub name: String,
}

impl RepoCoordinate {
    /// Parse `owner/name`. Anything else (extra segments, empty parts) is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let (owner, name) = raw.trim().split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
