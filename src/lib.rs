//! Bitbucket pull request client for the Server and Cloud REST APIs.
//!
//! The library resolves each logical pull request operation to the right URL
//! and verb for the active API flavor, shapes its JSON body and query string,
//! and hands the request to an injectable executor. Configuration loading and
//! diagnostic sinks used by the `bbpr` binary live alongside.

pub mod bitbucket;
pub mod config;
pub mod telemetry;

pub use bitbucket::{
    AccessToken, ApiBase, ApiExecutor, ApiFlavor, HttpExecutor, HttpExecutorConfig, Operation,
    PageRequest, PullRequestCommentOptions, PullRequestError, PullRequestOptions, PullRequests,
};
pub use config::{BbprConfig, OperationMode};
