mod config;
mod pipeline;
mod pr;
mod report;
mod timesheet;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// PR Timesheet — builds a weekly per-author timesheet from the pull requests
/// merged into a GitHub repository over the last 7 days.
///
/// Writes timesheet.csv and timesheet.json. Flags are optional; inside
/// GitHub Actions everything comes from the environment.
#[derive(Parser, Debug)]
#[command(name = "pr-timesheet", version, about)]
struct Cli {
    /// Config file (defaults to .pr-timesheet.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository as owner/name (defaults to GITHUB_REPOSITORY)
    #[arg(short, long)]
    repository: Option<String>,

    /// fixed-rate, text-annotation or structured-annotation
    #[arg(long)]
    policy: Option<String>,

    /// Hours credited per merged PR under the fixed-rate policy
    #[arg(long)]
    hours_per_pr: Option<String>,

    /// Directory for the two report files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl Cli {
    /// Flags win over both the config file and the environment.
    fn apply_to(self, config: &mut config::Config) {
        if let Some(repository) = self.repository {
            config.github.repository = Some(repository);
        }
        if let Some(policy) = self.policy {
            config.timesheet.policy = Some(policy);
        }
        if let Some(rate) = self.hours_per_pr {
            config.timesheet.hours_per_pr = Some(rate);
        }
        if let Some(dir) = self.output_dir {
            config.output.dir = Some(dir);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(written) => {
            info!(
                csv = %written.paths.csv.display(),
                json = %written.paths.json.display(),
                authors = written.authors,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "timesheet run failed");
            // Marks the step as failed in the Actions log.
            println!("::error::{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<report::Written, pipeline::RunError> {
    info!("loading configuration");
    let mut config = config::Config::load(cli.config.as_deref(), config::Environment::capture())?;
    cli.apply_to(&mut config);
    debug!(
        repository = ?config.github.repository,
        policy = ?config.timesheet.policy,
        "resolved configuration"
    );

    pipeline::run(&config, chrono::Utc::now()).await
}
