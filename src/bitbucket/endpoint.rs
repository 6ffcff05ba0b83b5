//! API flavor selection, base URL derivation, and credentials.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::error::PullRequestError;

const CLOUD_API_BASE: &str = "https://api.bitbucket.org/2.0";
const SERVER_API_PATH: &str = "rest/api/1.0";
const CLOUD_API_PATH: &str = "2.0";

/// Which Bitbucket API convention a client targets.
///
/// The flavor is resolved once per client and selects the URL template set
/// used by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApiFlavor {
    /// Self-hosted Bitbucket Server / Data Center REST API.
    #[default]
    Server,
    /// Hosted Bitbucket Cloud API.
    Cloud,
}

impl ApiFlavor {
    /// Returns the lowercase name of the flavor.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Cloud => "cloud",
        }
    }
}

impl fmt::Display for ApiFlavor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ApiFlavor {
    type Err = PullRequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "server" | "datacenter" | "data-center" => Ok(Self::Server),
            "cloud" => Ok(Self::Cloud),
            _ => Err(PullRequestError::UnsupportedFlavor(value.to_owned())),
        }
    }
}

/// API root URL paired with the flavor it serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    flavor: ApiFlavor,
    url: Url,
}

impl ApiBase {
    /// Uses `api_url` verbatim as the API root.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::InvalidUrl`] when `api_url` is not an
    /// absolute URL.
    pub fn parse(flavor: ApiFlavor, api_url: &str) -> Result<Self, PullRequestError> {
        let url = Url::parse(api_url)
            .map_err(|error| PullRequestError::InvalidUrl(format!("{api_url}: {error}")))?;
        Ok(Self { flavor, url })
    }

    /// Derives the API root from a web host URL such as
    /// `https://bitbucket.example.com`.
    ///
    /// Server hosts gain the `/rest/api/1.0` path. Cloud requests against
    /// `bitbucket.org` are redirected to `api.bitbucket.org/2.0`; any other
    /// Cloud host gains a `/2.0` path.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::InvalidUrl`] when the host URL cannot be
    /// parsed or carries no host.
    pub fn from_host(flavor: ApiFlavor, host_url: &str) -> Result<Self, PullRequestError> {
        let parsed = Url::parse(host_url)
            .map_err(|error| PullRequestError::InvalidUrl(format!("{host_url}: {error}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| PullRequestError::InvalidUrl("URL must include a host".to_owned()))?;

        if flavor == ApiFlavor::Cloud && host.eq_ignore_ascii_case("bitbucket.org") {
            return Self::parse(flavor, CLOUD_API_BASE);
        }

        let mut url = parsed.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.set_username("")
            .and_then(|()| url.set_password(None))
            .map_err(|()| {
                PullRequestError::InvalidUrl(format!("{host_url}: cannot strip credentials"))
            })?;

        let prefix = parsed.path().trim_matches('/');
        let api_path = match flavor {
            ApiFlavor::Server => SERVER_API_PATH,
            ApiFlavor::Cloud => CLOUD_API_PATH,
        };
        if prefix.is_empty() {
            url.set_path(api_path);
        } else {
            url.set_path(&format!("{prefix}/{api_path}"));
        }

        Ok(Self { flavor, url })
    }

    /// Flavor served by this API root.
    #[must_use]
    pub const fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    /// The API root URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// API root as a string without a trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    /// Appends an already interpolated path to the API root.
    ///
    /// Identifiers inside `path` are not re-encoded.
    #[must_use]
    pub fn request_url(&self, path: &str) -> String {
        join_url(self.as_str(), path)
    }
}

/// Joins an API root and an absolute path with exactly one separator.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Bearer token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, PullRequestError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PullRequestError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AccessToken(****)")
    }
}
