//! Bitbucket pull request client.
//!
//! One method set covers two API flavors: the self-hosted Server REST API
//! and the hosted Cloud API. The [`router`] resolves each logical operation
//! to a verb and URL template for the active [`ApiFlavor`]; [`body`] and
//! [`query`] shape the payload and query string; an [`ApiExecutor`] performs
//! the request. Request-shaping failures stop a call before anything is
//! sent, and executor failures are returned unchanged.

pub mod body;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod options;
pub mod pagination;
pub mod query;
pub mod router;

pub use body::{CommentBody, PullRequestBody};
pub use client::PullRequests;
pub use endpoint::{AccessToken, ApiBase, ApiFlavor};
pub use error::PullRequestError;
pub use executor::{ApiExecutor, HttpExecutor, HttpExecutorConfig, RequestBody};
pub use options::{PullRequestCommentOptions, PullRequestOptions};
pub use pagination::PageRequest;
pub use router::Operation;

#[cfg(test)]
pub use executor::MockApiExecutor;

#[cfg(test)]
mod tests;
