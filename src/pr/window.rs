use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::PullRequest;

/// Length of the trailing merge window.
pub const MERGE_WINDOW_DAYS: i64 = 7;

/// Keep the pull requests merged at or after `now - 7 days`.
///
/// Unmerged PRs are dropped. There is no upper bound: anything already
/// fetched and merged counts, even if its timestamp is slightly ahead of `now`.
pub fn merged_within_window(prs: Vec<PullRequest>, now: DateTime<Utc>) -> Vec<PullRequest> {
    let window_start = now - Duration::days(MERGE_WINDOW_DAYS);
    let merged: Vec<PullRequest> = prs
        .into_iter()
        .filter(|pr| pr.merged_at.is_some_and(|merged| merged >= window_start))
        .collect();

    if merged.is_empty() {
        info!("no merged pull requests in the last {} days", MERGE_WINDOW_DAYS);
    }
    merged
}
