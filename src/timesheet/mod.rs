pub mod annotation;

pub use annotation::{extract_duration, TimeSpent};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::pr::PullRequest;

/// How a merged pull request turns into time. One policy per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// Every merged PR is worth a flat number of hours.
    FixedRate { hours_per_pr: f64 },
    /// Decimal hours from the first `{H:MM}` in the description.
    TextAnnotation,
    /// Like `TextAnnotation`, also keeping raw hour and minute sums.
    StructuredAnnotation,
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Policy::FixedRate { .. } => write!(f, "fixed-rate"),
            Policy::TextAnnotation => write!(f, "text-annotation"),
            Policy::StructuredAnnotation => write!(f, "structured-annotation"),
        }
    }
}

/// Per-author accumulators for the structured policy.
///
/// `hours_decimal` is summed on its own and never re-derived from
/// `hours`/`minutes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StructuredTime {
    #[serde(rename = "hoursDecimal")]
    pub hours_decimal: f64,
    pub hours: u64,
    pub minutes: u64,
}

impl StructuredTime {
    fn record(&mut self, spent: TimeSpent) {
        self.hours_decimal += spent.decimal_hours();
        self.hours += u64::from(spent.hours);
        self.minutes += u64::from(spent.minutes);
    }

    /// Carry whole hours out of `minutes`, leaving it in `0..60`.
    pub fn normalize(&mut self) {
        self.hours += self.minutes / 60;
        self.minutes %= 60;
    }
}

impl std::fmt::Display for StructuredTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h{}min", self.hours, self.minutes)
    }
}

/// Accumulated time per author, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Timesheet {
    Hours(IndexMap<String, f64>),
    Structured(IndexMap<String, StructuredTime>),
}

impl Timesheet {
    pub fn len(&self) -> usize {
        match self {
            Timesheet::Hours(map) => map.len(),
            Timesheet::Structured(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn authors(&self) -> Vec<&str> {
        match self {
            Timesheet::Hours(map) => map.keys().map(String::as_str).collect(),
            Timesheet::Structured(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

/// Fold merged pull requests into a per-author timesheet.
///
/// Under the annotation policies a PR without `{H:MM}` in its description
/// is skipped with a warning; it contributes nothing, not even a zero entry.
pub fn aggregate(prs: &[PullRequest], policy: Policy) -> Timesheet {
    match policy {
        Policy::FixedRate { hours_per_pr } => {
            let mut totals: IndexMap<String, f64> = IndexMap::new();
            for pr in prs {
                *totals.entry(pr.author.clone()).or_insert(0.0) += hours_per_pr;
            }
            Timesheet::Hours(totals)
        }
        Policy::TextAnnotation => {
            let mut totals: IndexMap<String, f64> = IndexMap::new();
            for (pr, spent) in annotated(prs) {
                *totals.entry(pr.author.clone()).or_insert(0.0) += spent.decimal_hours();
            }
            Timesheet::Hours(totals)
        }
        Policy::StructuredAnnotation => {
            let mut totals: IndexMap<String, StructuredTime> = IndexMap::new();
            for (pr, spent) in annotated(prs) {
                totals.entry(pr.author.clone()).or_default().record(spent);
            }
            totals.values_mut().for_each(StructuredTime::normalize);
            Timesheet::Structured(totals)
        }
    }
}

/// PRs paired with their annotation, warning about the ones without.
fn annotated(prs: &[PullRequest]) -> impl Iterator<Item = (&PullRequest, TimeSpent)> {
    prs.iter().filter_map(|pr| {
        match pr.body.as_deref().and_then(extract_duration) {
            Some(spent) => {
                debug!(pr = pr.number, author = %pr.author, hours = spent.hours, minutes = spent.minutes, "found time annotation");
                Some((pr, spent))
            }
            None => {
                warn!(pr = pr.number, author = %pr.author, "no {{H:MM}} time annotation in description, skipping");
                None
            }
        }
    })
}
