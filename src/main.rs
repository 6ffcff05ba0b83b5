//! `bbpr` CLI entrypoint for browsing Bitbucket pull requests.

use std::io::{self, Write};
use std::process::ExitCode;

use bitbucket_pulls::telemetry::{StderrJsonlTelemetrySink, TelemetrySink, TracingTelemetrySink};
use bitbucket_pulls::{
    BbprConfig, HttpExecutor, HttpExecutorConfig, OperationMode, PullRequestError,
    PullRequestOptions, PullRequests,
};
use ortho_config::OrthoConfig;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ignored = writeln!(io::stderr().lock(), "{error}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ignored = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run() -> Result<(), PullRequestError> {
    let config = load_config()?;

    let flavor = config.api_flavor()?;
    let (project, repo) = config.require_repository_info()?;
    let token = config.resolve_token()?;
    let executor = HttpExecutor::new(
        HttpExecutorConfig::new(config.api_base()?, Some(token)).with_timeout(config.timeout()),
    )?;

    let telemetry: &dyn TelemetrySink = if config.trace_requests {
        &StderrJsonlTelemetrySink
    } else {
        &TracingTelemetrySink
    };
    let pulls = PullRequests::new(&executor, flavor).with_telemetry(telemetry);

    let mut options = PullRequestOptions::new(project, repo);
    match (config.operation_mode(), config.pull_request.as_deref()) {
        (OperationMode::PullRequestDiff, Some(id)) => {
            options.id = id.to_owned();
            let diff = pulls.diff(&options).await?;
            write_bytes(&diff)
        }
        (OperationMode::SinglePullRequest, Some(id)) => {
            options.id = id.to_owned();
            let pull_request = pulls.get(&options).await?;
            write_lines(&[summarise(&pull_request)])
        }
        _ => {
            options.states = config.state_filters();
            options.query.clone_from(&config.query);
            options.sort.clone_from(&config.sort);
            let listing = pulls.list(&options).await?;
            write_listing(&listing)
        }
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`PullRequestError::Configuration`] when ortho-config fails to
/// parse arguments or load configuration files.
fn load_config() -> Result<BbprConfig, PullRequestError> {
    BbprConfig::load().map_err(|error| PullRequestError::Configuration {
        message: error.to_string(),
    })
}

fn write_listing(listing: &Value) -> Result<(), PullRequestError> {
    let pull_requests = listing
        .as_array()
        .or_else(|| listing.get("values").and_then(Value::as_array));

    match pull_requests {
        Some(items) if !items.is_empty() => {
            let lines: Vec<String> = items.iter().map(summarise).collect();
            write_lines(&lines)
        }
        _ => write_lines(&["No pull requests found.".to_owned()]),
    }
}

/// One-line summary that reads both Cloud and Server payloads.
fn summarise(pull_request: &Value) -> String {
    let id = pull_request
        .get("id")
        .map_or_else(|| "?".to_owned(), Value::to_string);
    let state = pull_request
        .get("state")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN");
    let title = pull_request
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("untitled pull request");
    let author = pull_request
        .pointer("/author/display_name")
        .or_else(|| pull_request.pointer("/author/user/displayName"))
        .and_then(Value::as_str)
        .unwrap_or("unknown author");

    format!("#{id} [{state}] {title} ({author})")
}

fn write_lines(lines: &[String]) -> Result<(), PullRequestError> {
    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}").map_err(|error| PullRequestError::Io {
            message: error.to_string(),
        })?;
    }
    Ok(())
}

fn write_bytes(bytes: &[u8]) -> Result<(), PullRequestError> {
    io::stdout()
        .lock()
        .write_all(bytes)
        .map_err(|error| PullRequestError::Io {
            message: error.to_string(),
        })
}
