use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, info_span, instrument, Instrument};

use crate::config::{Config, ConfigError};
use crate::pr::window::merged_within_window;
use crate::pr::{GitHubClient, PrError, PullRequestSource};
use crate::report::{self, OutputPaths, ReportError, Written, OUTPUT_KEY};
use crate::timesheet::{self, Policy};

/// Everything that can abort a run. None of these are retried.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("GITHUB_TOKEN not found")]
    MissingCredential,

    #[error(transparent)]
    Upstream(PrError),

    #[error(transparent)]
    FileSystem(#[from] ReportError),
}

impl From<PrError> for RunError {
    fn from(err: PrError) -> Self {
        match err {
            PrError::MissingToken => RunError::MissingCredential,
            other => RunError::Upstream(other),
        }
    }
}

/// Build the GitHub client from `config` and run the whole batch.
pub async fn run(config: &Config, now: DateTime<Utc>) -> Result<Written, RunError> {
    let token = config.github_token().ok_or(RunError::MissingCredential)?;
    let repo = config.repository()?;
    let policy = config.policy()?;
    let paths = config
        .output
        .dir
        .as_deref()
        .map(OutputPaths::in_dir)
        .unwrap_or_default();

    let span = info_span!("timesheet", repo = %repo, policy = %policy);
    let client = GitHubClient::new(repo, Some(token), config.github.api_url.as_deref())?;

    let written = run_with_source(&client, policy, &paths, now)
        .instrument(span)
        .await?;
    report::publish_output(
        OUTPUT_KEY,
        &written.paths.csv.display().to_string(),
        config.github.output_file.as_deref(),
    )?;
    Ok(written)
}

/// Fetch, filter, aggregate and write. Nothing is written unless the fetch
/// succeeds.
#[instrument(skip(source, paths))]
pub async fn run_with_source(
    source: &dyn PullRequestSource,
    policy: Policy,
    paths: &OutputPaths,
    now: DateTime<Utc>,
) -> Result<Written, RunError> {
    info!("fetching closed pull requests");
    let fetched = source.closed_pull_requests().await?;
    debug!(fetched = fetched.len(), "fetched pull requests");

    let merged = merged_within_window(fetched, now);
    info!(merged = merged.len(), "pull requests merged in window");

    let sheet = timesheet::aggregate(&merged, policy);
    info!(authors = sheet.len(), "aggregated timesheet");

    let written = report::output(&sheet, paths)?;
    report::print_summary(&sheet, &written);
    Ok(written)
}
