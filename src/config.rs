use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::sync::LazyLock;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pr::RepoCoordinate;
use crate::timesheet::Policy;

/// Default location of the optional config file.
pub const CONFIG_FILE: &str = ".pr-timesheet.toml";

/// Rate used when `hours_per_pr` is missing or unusable.
pub const DEFAULT_HOURS_PER_PR: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Repository not configured (set GITHUB_REPOSITORY or --repository)")]
    MissingRepository,

    #[error("Invalid repository {0:?}, expected owner/name")]
    InvalidRepository(String),

    #[error("Unknown policy {0:?}, expected fixed-rate, text-annotation or structured-annotation")]
    UnknownPolicy(String),
}

/// Top-level configuration loaded from .pr-timesheet.toml, then overlaid
/// with the automation environment and command-line flags.
///
/// All fields are optional; a run inside GitHub Actions needs no file at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub timesheet: TimesheetConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN at load time.
    pub token: Option<String>,
    /// Repository as `owner/name`.
    pub repository: Option<String>,
    /// REST API root, for GitHub Enterprise Server.
    pub api_url: Option<String>,
    /// File that receives published step outputs (GITHUB_OUTPUT).
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimesheetConfig {
    /// One of `fixed-rate`, `text-annotation`, `structured-annotation`.
    pub policy: Option<String>,
    /// Hours credited per merged PR under the fixed-rate policy. Kept as
    /// raw text because action inputs always arrive as strings.
    #[serde(default, deserialize_with = "text_or_number")]
    pub hours_per_pr: Option<String>,
}

/// Accept `hours_per_pr = 2` as well as `hours_per_pr = "2"`.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory for timesheet.csv and timesheet.json. Defaults to the
    /// working directory.
    pub dir: Option<PathBuf>,
}

/// Snapshot of the process environment variables the tool cares about.
/// Captured once in `main` so nothing below reads the environment ad hoc.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub token: Option<String>,
    pub repository: Option<String>,
    pub api_url: Option<String>,
    pub output_file: Option<PathBuf>,
    pub hours_per_pr: Option<String>,
    pub policy: Option<String>,
}

impl Environment {
    pub fn capture() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            token: var("GITHUB_TOKEN"),
            repository: var("GITHUB_REPOSITORY"),
            api_url: var("GITHUB_API_URL"),
            output_file: var("GITHUB_OUTPUT").map(PathBuf::from),
            hours_per_pr: var("INPUT_HOURS_PER_PR"),
            policy: var("INPUT_POLICY"),
        }
    }
}

impl Config {
    /// Load configuration from `path` (or .pr-timesheet.toml in the current
    /// directory), then apply the captured environment.
    /// Returns default config if the file doesn't exist.
    pub fn load(path: Option<&Path>, env: Environment) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_environment(env);
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Token and repository from the file win over the environment; action
    /// inputs win over the file.
    pub fn apply_environment(&mut self, env: Environment) {
        if self.github.token.is_none() {
            self.github.token = env.token;
        }
        if self.github.repository.is_none() {
            self.github.repository = env.repository;
        }
        if self.github.api_url.is_none() {
            self.github.api_url = env.api_url;
        }
        if env.output_file.is_some() {
            self.github.output_file = env.output_file;
        }
        if env.hours_per_pr.is_some() {
            self.timesheet.hours_per_pr = env.hours_per_pr;
        }
        if env.policy.is_some() {
            self.timesheet.policy = env.policy;
        }
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref()
    }

    pub fn repository(&self) -> Result<RepoCoordinate, ConfigError> {
        let raw = self
            .github
            .repository
            .as_deref()
            .ok_or(ConfigError::MissingRepository)?;
        RepoCoordinate::parse(raw).ok_or_else(|| ConfigError::InvalidRepository(raw.to_string()))
    }

    /// Resolve the aggregation policy. Fixed-rate is the default.
    pub fn policy(&self) -> Result<Policy, ConfigError> {
        let name = self
            .timesheet
            .policy
            .as_deref()
            .map(|p| p.trim().to_ascii_lowercase());
        match name.as_deref() {
            None | Some("") | Some("fixed-rate") => Ok(Policy::FixedRate {
                hours_per_pr: parse_hours_per_pr(self.timesheet.hours_per_pr.as_deref()),
            }),
            Some("text-annotation") => Ok(Policy::TextAnnotation),
            Some("structured-annotation") => Ok(Policy::StructuredAnnotation),
            Some(_) => Err(ConfigError::UnknownPolicy(
                self.timesheet.policy.clone().unwrap_or_default(),
            )),
        }
    }
}

/// Longest leading decimal number, e.g. `2` in `"2h"`.
static LEADING_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)").unwrap()
});

/// Parse the per-PR rate from the longest numeric prefix of the input.
/// Falls back to [`DEFAULT_HOURS_PER_PR`] when nothing parses or the
/// result is zero.
pub fn parse_hours_per_pr(raw: Option<&str>) -> f64 {
    raw.and_then(|r| LEADING_NUMBER_REGEX.find(r.trim_start()))
        .and_then(|number| number.as_str().parse::<f64>().ok())
        .filter(|rate| !rate.is_nan() && *rate != 0.0)
        .unwrap_or(DEFAULT_HOURS_PER_PR)
}
