//! Error types exposed by the Bitbucket pull request layer.

use thiserror::Error;

/// Errors surfaced while shaping requests or talking to Bitbucket.
///
/// Request-shaping failures (`BodySerialisation`, `InvalidUrl`) are raised by
/// this crate before anything is dispatched. Transport failures are produced
/// by an [`ApiExecutor`](super::executor::ApiExecutor) and returned to the
/// caller unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PullRequestError {
    /// A request body could not be serialised to JSON.
    #[error("request body serialisation failed: {message}")]
    BodySerialisation {
        /// Serializer error detail.
        message: String,
    },

    /// A request URL could not be parsed or built.
    #[error("request URL is invalid: {0}")]
    InvalidUrl(String),

    /// The configured API flavor is not recognised.
    #[error("unsupported API flavor: {0} (expected `server` or `cloud`)")]
    UnsupportedFlavor(String),

    /// Pagination parameters were out of range.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// The authentication token was missing or blank.
    #[error("access token is required")]
    MissingToken,

    /// Bitbucket rejected the supplied credentials.
    #[error("Bitbucket rejected the credentials: {message}")]
    Authentication {
        /// Error message returned with the 401/403 response.
        message: String,
    },

    /// Bitbucket returned a non-authentication API error.
    #[error("Bitbucket API error (status {status}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Networking failed while calling Bitbucket.
    #[error("network error talking to Bitbucket: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("response decoding failed: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,

    /// Configuration could not be loaded or was incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}
