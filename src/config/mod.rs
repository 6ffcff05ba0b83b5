//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.bbpr.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `BBPR_*`, plus the legacy `BITBUCKET_TOKEN`
//!    for the token
//! 4. **Command-line arguments** – `--base-url`/`-b`, `--token`/`-t`, and so on
//!
//! # Configuration File
//!
//! ```toml
//! base_url = "https://bitbucket.example.com"
//! flavor = "server"
//! token = "example-token"
//! project = "PROJ"
//! repo = "service"
//! states = "OPEN,MERGED"
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::bitbucket::{AccessToken, ApiBase, ApiFlavor, PullRequestError};

const LEGACY_TOKEN_VARIABLE: &str = "BITBUCKET_TOKEN";
const CLOUD_HOST: &str = "https://bitbucket.org";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Operation mode determined by CLI arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Show one pull request.
    SinglePullRequest,
    /// Print the raw diff of one pull request.
    PullRequestDiff,
    /// List pull requests of a repository.
    RepositoryListing,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `BBPR_BASE_URL` or `--base-url`: Bitbucket host URL
/// - `BBPR_FLAVOR` or `--flavor`: `server` or `cloud`
/// - `BBPR_TOKEN`, `BITBUCKET_TOKEN`, or `--token`: Access token
/// - `BBPR_PROJECT` or `--project`: Project key or Cloud workspace
/// - `BBPR_REPO` or `--repo`: Repository slug
///
/// # Example
///
/// ```no_run
/// use bitbucket_pulls::BbprConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = BbprConfig::load().expect("failed to load configuration");
/// let (project, repo) = config
///     .require_repository_info()
///     .expect("repository required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "BBPR",
    discovery(
        dotfile_name = ".bbpr.toml",
        config_file_name = "bbpr.toml",
        app_name = "bbpr"
    )
)]
pub struct BbprConfig {
    /// Bitbucket host URL (e.g. `https://bitbucket.example.com`).
    ///
    /// Server hosts gain the `/rest/api/1.0` API path. Cloud defaults to
    /// `https://bitbucket.org` when unset.
    #[ortho_config(cli_short = 'b')]
    pub base_url: Option<String>,

    /// API flavor: `server` (also `datacenter`) or `cloud`.
    #[ortho_config(cli_short = 'f')]
    pub flavor: String,

    /// Access token used for bearer authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `BBPR_TOKEN` or `BITBUCKET_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Project key (Server) or workspace (Cloud).
    #[ortho_config(cli_short = 'p')]
    pub project: Option<String>,

    /// Repository slug.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Pull request identifier. When set, that pull request is shown instead
    /// of listing the repository.
    #[ortho_config(cli_short = 'i')]
    pub pull_request: Option<String>,

    /// Comma-separated state filter for listings (e.g. `OPEN,MERGED`).
    #[ortho_config(cli_short = 's')]
    pub states: Option<String>,

    /// Free-text query filter for listings.
    #[ortho_config(cli_short = 'q')]
    pub query: Option<String>,

    /// Sort key for listings (e.g. `-updated_on`).
    #[ortho_config()]
    pub sort: Option<String>,

    /// Prints the raw diff of `pull_request` instead of its summary.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so this is only read from the CLI or a config file.
    #[ortho_config(cli_short = 'd')]
    pub diff: bool,

    /// HTTP timeout in seconds. Defaults to 30.
    #[ortho_config()]
    pub timeout_seconds: u64,

    /// Writes every prepared create, merge, or decline request to stderr as
    /// JSON lines.
    #[ortho_config()]
    pub trace_requests: bool,
}

impl Default for BbprConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            flavor: ApiFlavor::Server.as_str().to_owned(),
            token: None,
            project: None,
            repo: None,
            pull_request: None,
            states: None,
            query: None,
            sort: None,
            diff: false,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            trace_requests: false,
        }
    }
}

impl BbprConfig {
    /// Resolves the token from configuration or the legacy `BITBUCKET_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::MissingToken`] when no source provides a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<AccessToken, PullRequestError> {
        let token = self
            .token
            .clone()
            .or_else(|| env::var(LEGACY_TOKEN_VARIABLE).ok())
            .ok_or(PullRequestError::MissingToken)?;
        AccessToken::new(token)
    }

    /// Returns project and repository if both are configured.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::Configuration`] when either is missing.
    pub fn require_repository_info(&self) -> Result<(&str, &str), PullRequestError> {
        match (&self.project, &self.repo) {
            (Some(project), Some(repo)) => Ok((project.as_str(), repo.as_str())),
            (None, _) => Err(PullRequestError::Configuration {
                message: "project is required (use --project or -p)".to_owned(),
            }),
            (_, None) => Err(PullRequestError::Configuration {
                message: "repository slug is required (use --repo or -r)".to_owned(),
            }),
        }
    }

    /// Parses the configured flavor.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::UnsupportedFlavor`] for unknown names.
    pub fn api_flavor(&self) -> Result<ApiFlavor, PullRequestError> {
        self.flavor.parse()
    }

    /// Derives the API root from the host URL and flavor.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::Configuration`] when a Server flavor has no
    /// host URL, [`PullRequestError::UnsupportedFlavor`] for an unknown
    /// flavor, or [`PullRequestError::InvalidUrl`] for a malformed host.
    pub fn api_base(&self) -> Result<ApiBase, PullRequestError> {
        let flavor = self.api_flavor()?;
        let host = match (self.base_url.as_deref(), flavor) {
            (Some(url), _) => url,
            (None, ApiFlavor::Cloud) => CLOUD_HOST,
            (None, ApiFlavor::Server) => {
                return Err(PullRequestError::Configuration {
                    message: "Bitbucket Server host URL is required (use --base-url or -b)"
                        .to_owned(),
                });
            }
        };
        ApiBase::from_host(flavor, host)
    }

    /// Splits the comma-separated state filter into upper-case values.
    #[must_use]
    pub fn state_filters(&self) -> Vec<String> {
        self.states
            .as_deref()
            .map(|states| {
                states
                    .split(',')
                    .map(str::trim)
                    .filter(|state| !state.is_empty())
                    .map(str::to_ascii_uppercase)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// HTTP timeout for the executor.
    ///
    /// A `timeout_seconds` of zero falls back to the 30 second default.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        if self.timeout_seconds == 0 {
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)
        } else {
            Duration::from_secs(self.timeout_seconds)
        }
    }

    /// Determines the operation mode based on provided configuration.
    ///
    /// Returns `PullRequestDiff` when a pull request and `diff` are both set,
    /// `SinglePullRequest` when only a pull request is set, and
    /// `RepositoryListing` otherwise.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.pull_request.is_none() {
            OperationMode::RepositoryListing
        } else if self.diff {
            OperationMode::PullRequestDiff
        } else {
            OperationMode::SinglePullRequest
        }
    }
}

#[cfg(test)]
mod tests;
