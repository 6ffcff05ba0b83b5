//! High-level pull request facade.
//!
//! Every operation follows the same path: the router picks the template and
//! verb for the active flavor, identifiers are interpolated, optional
//! filters are composed onto the URL, and the body is serialised. Only then
//! is the request handed to the executor. A failure at any step returns
//! before dispatch, and executor errors come back unchanged.

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::body::{CommentBody, PullRequestBody};
use super::endpoint::{ApiFlavor, join_url};
use super::error::PullRequestError;
use super::executor::{ApiExecutor, RequestBody};
use super::options::{PullRequestCommentOptions, PullRequestOptions};
use super::pagination::PageRequest;
use super::query::QueryFilters;
use super::router::{BodyKind, Dispatch, FilterSet, Operation, Route, RouteTarget};
use crate::telemetry::{TelemetryEvent, TelemetrySink, TracingTelemetrySink};

const DEFAULT_TELEMETRY: &TracingTelemetrySink = &TracingTelemetrySink;

/// Pull request operations for one API flavor.
///
/// # Example
///
/// ```no_run
/// use bitbucket_pulls::bitbucket::{
///     AccessToken, ApiBase, ApiFlavor, HttpExecutor, HttpExecutorConfig, PullRequestOptions,
///     PullRequests,
/// };
///
/// # async fn demo() -> Result<(), bitbucket_pulls::bitbucket::PullRequestError> {
/// let api_base = ApiBase::from_host(ApiFlavor::Cloud, "https://bitbucket.org")?;
/// let token = AccessToken::new("secret")?;
/// let executor = HttpExecutor::new(HttpExecutorConfig::new(api_base, Some(token)))?;
/// let pulls = PullRequests::new(&executor, ApiFlavor::Cloud);
///
/// let options = PullRequestOptions::new("workspace", "service").with_states(["OPEN"]);
/// let open = pulls.list(&options).await?;
/// # let _ = open;
/// # Ok(())
/// # }
/// ```
pub struct PullRequests<'client, Executor>
where
    Executor: ApiExecutor,
{
    executor: &'client Executor,
    flavor: ApiFlavor,
    telemetry: &'client dyn TelemetrySink,
}

impl<'client, Executor> PullRequests<'client, Executor>
where
    Executor: ApiExecutor,
{
    /// Creates a facade that reports diagnostics through `tracing`.
    #[must_use]
    pub const fn new(executor: &'client Executor, flavor: ApiFlavor) -> Self {
        Self {
            executor,
            flavor,
            telemetry: DEFAULT_TELEMETRY,
        }
    }

    /// Redirects diagnostic records to `telemetry`.
    #[must_use]
    pub const fn with_telemetry(mut self, telemetry: &'client dyn TelemetrySink) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Flavor whose URL templates this facade uses.
    #[must_use]
    pub const fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    /// Opens a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when the body cannot
    /// be serialised, or the executor's error unchanged.
    pub async fn create(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Create, Payload::PullRequest(options))
            .await
    }

    /// Edits the pull request identified by `options.id`.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when the body cannot
    /// be serialised, or the executor's error unchanged.
    pub async fn update(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Update, Payload::PullRequest(options))
            .await
    }

    /// Lists pull requests, filtered by state, free-text query, and sort key.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::InvalidUrl`] when a filter cannot be
    /// applied, or the executor's error unchanged.
    pub async fn list(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::List, Payload::PullRequest(options))
            .await
    }

    /// Fetches one pull request.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn get(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Get, Payload::PullRequest(options))
            .await
    }

    /// Lists activity across all pull requests of the repository.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn activities(
        &self,
        options: &PullRequestOptions,
    ) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Activities, Payload::PullRequest(options))
            .await
    }

    /// Fetches the activity log of one pull request.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn activity(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Activity, Payload::PullRequest(options))
            .await
    }

    /// Lists the commits of a pull request.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn commits(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Commits, Payload::PullRequest(options))
            .await
    }

    /// Fetches the patch of a pull request as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn patch(&self, options: &PullRequestOptions) -> Result<Vec<u8>, PullRequestError> {
        self.fetch_raw(Operation::Patch, options).await
    }

    /// Fetches the diff of a pull request as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn diff(&self, options: &PullRequestOptions) -> Result<Vec<u8>, PullRequestError> {
        self.fetch_raw(Operation::Diff, options).await
    }

    /// Merges a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when the body cannot
    /// be serialised, or the executor's error unchanged.
    pub async fn merge(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Merge, Payload::PullRequest(options))
            .await
    }

    /// Declines a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when the body cannot
    /// be serialised, or the executor's error unchanged.
    pub async fn decline(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Decline, Payload::PullRequest(options))
            .await
    }

    /// Approves a pull request.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn approve(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Approve, Payload::PullRequest(options))
            .await
    }

    /// Withdraws an approval.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn unapprove(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::UnApprove, Payload::PullRequest(options))
            .await
    }

    /// Requests changes on a pull request.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn request_changes(
        &self,
        options: &PullRequestOptions,
    ) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::RequestChanges, Payload::PullRequest(options))
            .await
    }

    /// Withdraws a change request.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn unrequest_changes(
        &self,
        options: &PullRequestOptions,
    ) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::UnRequestChanges, Payload::PullRequest(options))
            .await
    }

    /// Adds a comment, optionally as a reply to `options.parent`.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when the body cannot
    /// be serialised, or the executor's error unchanged.
    pub async fn add_comment(
        &self,
        options: &PullRequestCommentOptions,
    ) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::AddComment, Payload::Comment(options))
            .await
    }

    /// Replaces the text of comment `options.comment_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when the body cannot
    /// be serialised, or the executor's error unchanged.
    pub async fn update_comment(
        &self,
        options: &PullRequestCommentOptions,
    ) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::UpdateComment, Payload::Comment(options))
            .await
    }

    /// Deletes comment `options.comment_id`.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn delete_comment(
        &self,
        options: &PullRequestCommentOptions,
    ) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::DeleteComment, Payload::Comment(options))
            .await
    }

    /// Lists the comments of a pull request.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn comments(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Comments, Payload::PullRequest(options))
            .await
    }

    /// Fetches comment `options.comment_id`.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged.
    pub async fn comment(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Comment, Payload::PullRequest(options))
            .await
    }

    /// Lists build statuses, filtered by free-text query and sort key.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::InvalidUrl`] when a filter cannot be
    /// applied, or the executor's error unchanged.
    pub async fn statuses(&self, options: &PullRequestOptions) -> Result<Value, PullRequestError> {
        self.fetch_json(Operation::Statuses, Payload::PullRequest(options))
            .await
    }

    async fn fetch_json(
        &self,
        operation: Operation,
        payload: Payload<'_>,
    ) -> Result<Value, PullRequestError> {
        let prepared = self.prepare(operation, payload)?;

        if prepared.route.dispatch == Dispatch::Paginated {
            return self
                .executor
                .execute_paginated(
                    prepared.route.method,
                    &prepared.url,
                    prepared.body,
                    payload.page(),
                )
                .await;
        }

        if let Some(cancellation) = payload.cancellation() {
            return self
                .executor
                .execute_with_context(
                    prepared.route.method,
                    &prepared.url,
                    prepared.body,
                    cancellation,
                )
                .await;
        }

        self.executor
            .execute(prepared.route.method, &prepared.url, prepared.body)
            .await
    }

    async fn fetch_raw(
        &self,
        operation: Operation,
        options: &PullRequestOptions,
    ) -> Result<Vec<u8>, PullRequestError> {
        let prepared = self.prepare(operation, Payload::PullRequest(options))?;
        self.executor
            .execute_raw(prepared.route.method, &prepared.url, prepared.body)
            .await
    }

    fn prepare(
        &self,
        operation: Operation,
        payload: Payload<'_>,
    ) -> Result<PreparedRequest, PullRequestError> {
        let route = operation.route();
        let path = operation.path(self.flavor, payload.target());
        let url = payload
            .filters(route.filters)
            .apply(&join_url(&self.executor.api_base_url(), &path))?;
        let body = payload.body(route.body)?;

        if route.records_diagnostic {
            self.telemetry.record(TelemetryEvent::RequestPrepared {
                operation: operation.name().to_owned(),
                method: route.method.to_string(),
                url: url.clone(),
                body: body.as_json().map(ToOwned::to_owned),
            });
        }

        Ok(PreparedRequest { route, url, body })
    }
}

/// A request ready for the executor.
struct PreparedRequest {
    route: Route,
    url: String,
    body: RequestBody,
}

/// The options record an operation was called with.
#[derive(Clone, Copy)]
enum Payload<'options> {
    PullRequest(&'options PullRequestOptions),
    Comment(&'options PullRequestCommentOptions),
}

impl<'options> Payload<'options> {
    fn target(self) -> RouteTarget<'options> {
        match self {
            Self::PullRequest(options) => RouteTarget::from(options),
            Self::Comment(options) => RouteTarget::from(options),
        }
    }

    fn filters(self, set: FilterSet) -> QueryFilters<'options> {
        match (self, set) {
            (Self::PullRequest(options), FilterSet::StateQueryAndSort) => {
                QueryFilters::all(options)
            }
            (Self::PullRequest(options), FilterSet::QueryAndSort) => {
                QueryFilters::query_and_sort(options)
            }
            (_, FilterSet::None) | (Self::Comment(_), _) => QueryFilters::default(),
        }
    }

    fn body(self, kind: BodyKind) -> Result<RequestBody, PullRequestError> {
        match (kind, self) {
            (BodyKind::None, _) => Ok(RequestBody::None),
            (BodyKind::Empty, _) => Ok(RequestBody::Empty),
            (BodyKind::PullRequest, Self::PullRequest(options)) => {
                PullRequestBody::from_options(options)
                    .to_json()
                    .map(RequestBody::Json)
            }
            (BodyKind::Comment, Self::Comment(options)) => CommentBody::from_options(options)
                .to_json()
                .map(RequestBody::Json),
            (BodyKind::PullRequest, Self::Comment(_)) | (BodyKind::Comment, Self::PullRequest(_)) => {
                Err(PullRequestError::BodySerialisation {
                    message: format!("{kind:?} body cannot be built from these options"),
                })
            }
        }
    }

    fn page(self) -> Option<PageRequest> {
        match self {
            Self::PullRequest(options) => options.page,
            Self::Comment(_) => None,
        }
    }

    fn cancellation(self) -> Option<&'options CancellationToken> {
        match self {
            Self::PullRequest(options) => options.cancellation.as_ref(),
            Self::Comment(options) => options.cancellation.as_ref(),
        }
    }
}
