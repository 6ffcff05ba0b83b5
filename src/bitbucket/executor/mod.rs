//! Executors that carry shaped requests to Bitbucket.
//!
//! The pull request layer never talks to the network itself. It builds a
//! verb, an absolute URL, and an optional body, then hands them to an
//! [`ApiExecutor`], which owns authentication and pagination. Tests replace
//! the HTTP implementation with a mock.

mod error_mapping;
mod transport;

pub use transport::{HttpExecutor, HttpExecutorConfig};

use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error::PullRequestError;
use super::pagination::PageRequest;

/// Request payload handed to an executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body at all.
    #[default]
    None,
    /// A zero-length body on a write verb.
    Empty,
    /// Serialised JSON text.
    Json(String),
}

impl RequestBody {
    /// JSON text carried by the body, if any.
    #[must_use]
    pub fn as_json(&self) -> Option<&str> {
        match self {
            Self::Json(json) => Some(json.as_str()),
            Self::None | Self::Empty => None,
        }
    }
}

/// Transport capable of executing Bitbucket REST requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiExecutor: Send + Sync {
    /// Root of the REST API, e.g. `https://api.bitbucket.org/2.0`.
    fn api_base_url(&self) -> String;

    /// Executes a single request and decodes the JSON response.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<Value, PullRequestError>;

    /// Executes a single request that the caller may cancel.
    async fn execute_with_context(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
        cancellation: &CancellationToken,
    ) -> Result<Value, PullRequestError>;

    /// Executes a listing request, following or selecting pages.
    async fn execute_paginated(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
        page: Option<PageRequest>,
    ) -> Result<Value, PullRequestError>;

    /// Executes a request and returns the undecoded response bytes.
    async fn execute_raw(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<Vec<u8>, PullRequestError>;
}
