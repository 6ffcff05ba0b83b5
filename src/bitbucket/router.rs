//! Operation router: maps each pull request operation to its route.
//!
//! Two URL families serve the same logical API. On Server, create, get and
//! merge live under `/projects/...` while everything else lives under
//! `/repositories/...`; the mapping is reproduced exactly because the hosts
//! being targeted depend on it. Cloud routes every operation through
//! `/repositories/...`.

use std::fmt;

use http::Method;

use super::endpoint::ApiFlavor;
use super::options::{PullRequestCommentOptions, PullRequestOptions};

/// Logical pull request operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Open a pull request.
    Create,
    /// Edit a pull request.
    Update,
    /// List pull requests in a repository.
    List,
    /// Fetch one pull request.
    Get,
    /// Repository-wide pull request activity.
    Activities,
    /// Activity of one pull request.
    Activity,
    /// Commits of a pull request.
    Commits,
    /// Raw patch of a pull request.
    Patch,
    /// Raw diff of a pull request.
    Diff,
    /// Merge a pull request.
    Merge,
    /// Decline a pull request.
    Decline,
    /// Approve a pull request.
    Approve,
    /// Withdraw an approval.
    UnApprove,
    /// Request changes on a pull request.
    RequestChanges,
    /// Withdraw a change request.
    UnRequestChanges,
    /// Add a comment.
    AddComment,
    /// Edit a comment.
    UpdateComment,
    /// Delete a comment.
    DeleteComment,
    /// List comments.
    Comments,
    /// Fetch one comment.
    Comment,
    /// Build statuses of a pull request.
    Statuses,
}

/// How an operation's response is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// One JSON response.
    Single,
    /// All pages aggregated by the executor.
    Paginated,
    /// Raw bytes, never JSON-decoded.
    Raw,
}

/// Body an operation sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// No body.
    None,
    /// A zero-length body.
    Empty,
    /// A [`PullRequestBody`](super::body::PullRequestBody).
    PullRequest,
    /// A [`CommentBody`](super::body::CommentBody).
    Comment,
}

/// Query filters an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSet {
    /// No filters.
    None,
    /// `q` and `sort`.
    QueryAndSort,
    /// Repeated `state`, `q`, and `sort`.
    StateQueryAndSort,
}

/// Everything needed to dispatch an operation apart from its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// HTTP verb.
    pub method: Method,
    /// Response collection strategy.
    pub dispatch: Dispatch,
    /// Body carried by the request.
    pub body: BodyKind,
    /// Filters composed onto the URL.
    pub filters: FilterSet,
    /// Whether the outgoing request is reported to the telemetry sink.
    pub records_diagnostic: bool,
}

impl Route {
    const fn new(method: Method, dispatch: Dispatch, body: BodyKind) -> Self {
        Self {
            method,
            dispatch,
            body,
            filters: FilterSet::None,
            records_diagnostic: false,
        }
    }

    const fn filtered(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    const fn diagnosed(mut self) -> Self {
        self.records_diagnostic = true;
        self
    }
}

/// Identifiers interpolated into a URL template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteTarget<'options> {
    /// Project key or workspace.
    pub project: &'options str,
    /// Repository slug.
    pub repo_slug: &'options str,
    /// Pull request identifier.
    pub pull_request_id: &'options str,
    /// Comment identifier.
    pub comment_id: &'options str,
}

impl<'options> From<&'options PullRequestOptions> for RouteTarget<'options> {
    fn from(options: &'options PullRequestOptions) -> Self {
        Self {
            project: &options.project,
            repo_slug: &options.repo_slug,
            pull_request_id: &options.id,
            comment_id: &options.comment_id,
        }
    }
}

impl<'options> From<&'options PullRequestCommentOptions> for RouteTarget<'options> {
    fn from(options: &'options PullRequestCommentOptions) -> Self {
        Self {
            project: &options.project,
            repo_slug: &options.repo_slug,
            pull_request_id: &options.pull_request_id,
            comment_id: &options.comment_id,
        }
    }
}

impl Operation {
    /// Every operation, in catalog order.
    pub const ALL: [Self; 21] = [
        Self::Create,
        Self::Update,
        Self::List,
        Self::Get,
        Self::Activities,
        Self::Activity,
        Self::Commits,
        Self::Patch,
        Self::Diff,
        Self::Merge,
        Self::Decline,
        Self::Approve,
        Self::UnApprove,
        Self::RequestChanges,
        Self::UnRequestChanges,
        Self::AddComment,
        Self::UpdateComment,
        Self::DeleteComment,
        Self::Comments,
        Self::Comment,
        Self::Statuses,
    ];

    /// Stable operation name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::List => "list",
            Self::Get => "get",
            Self::Activities => "activities",
            Self::Activity => "activity",
            Self::Commits => "commits",
            Self::Patch => "patch",
            Self::Diff => "diff",
            Self::Merge => "merge",
            Self::Decline => "decline",
            Self::Approve => "approve",
            Self::UnApprove => "unapprove",
            Self::RequestChanges => "request_changes",
            Self::UnRequestChanges => "unrequest_changes",
            Self::AddComment => "add_comment",
            Self::UpdateComment => "update_comment",
            Self::DeleteComment => "delete_comment",
            Self::Comments => "comments",
            Self::Comment => "comment",
            Self::Statuses => "statuses",
        }
    }

    /// Verb, dispatch strategy, body, and filters for this operation.
    #[must_use]
    pub const fn route(self) -> Route {
        use BodyKind as B;
        use Dispatch as D;

        match self {
            Self::Create => Route::new(Method::POST, D::Single, B::PullRequest).diagnosed(),
            Self::Update => Route::new(Method::PUT, D::Single, B::PullRequest),
            Self::List => Route::new(Method::GET, D::Paginated, B::None)
                .filtered(FilterSet::StateQueryAndSort),
            Self::Get | Self::Activity | Self::Comment => Route::new(Method::GET, D::Single, B::None),
            Self::Activities | Self::Commits | Self::Comments => {
                Route::new(Method::GET, D::Paginated, B::None)
            }
            Self::Patch | Self::Diff => Route::new(Method::GET, D::Raw, B::None),
            Self::Merge | Self::Decline => {
                Route::new(Method::POST, D::Single, B::PullRequest).diagnosed()
            }
            Self::Approve | Self::RequestChanges => Route::new(Method::POST, D::Single, B::Empty),
            Self::UnApprove | Self::UnRequestChanges | Self::DeleteComment => {
                Route::new(Method::DELETE, D::Single, B::None)
            }
            Self::AddComment => Route::new(Method::POST, D::Single, B::Comment),
            Self::UpdateComment => Route::new(Method::PUT, D::Single, B::Comment),
            Self::Statuses => Route::new(Method::GET, D::Paginated, B::None)
                .filtered(FilterSet::QueryAndSort),
        }
    }

    /// URL template for this operation under `flavor`.
    #[must_use]
    pub const fn template(self, flavor: ApiFlavor) -> &'static str {
        match flavor {
            ApiFlavor::Server => self.server_template(),
            ApiFlavor::Cloud => self.cloud_template(),
        }
    }

    /// Interpolated path (relative to the API root) for `target`.
    #[must_use]
    pub fn path(self, flavor: ApiFlavor, target: RouteTarget<'_>) -> String {
        interpolate(self.template(flavor), target)
    }

    const fn server_template(self) -> &'static str {
        match self {
            Self::Create => "/projects/{project}/repos/{repo}/pull-requests/",
            Self::Update => "/repositories/{project}/{repo}/pullrequests/{id}",
            Self::List => "/repositories/{project}/{repo}/pullrequests/",
            Self::Get => "/projects/{project}/{repo}/pull-requests/{id}",
            Self::Activities => "/repositories/{project}/{repo}/pullrequests/activity",
            Self::Activity => "/repositories/{project}/{repo}/pullrequests/{id}/activity",
            Self::Commits => "/repositories/{project}/{repo}/pullrequests/{id}/commits",
            Self::Patch => "/repositories/{project}/{repo}/pullrequests/{id}/patch",
            Self::Diff => "/repositories/{project}/{repo}/pullrequests/{id}/diff",
            Self::Merge => "/projects/{project}/repos/{repo}/pull-requests/{id}/merge",
            Self::Decline => "/repositories/{project}/{repo}/pullrequests/{id}/decline",
            Self::Approve | Self::UnApprove => {
                "/repositories/{project}/{repo}/pullrequests/{id}/approve"
            }
            Self::RequestChanges | Self::UnRequestChanges => {
                "/repositories/{project}/{repo}/pullrequests/{id}/request-changes"
            }
            Self::AddComment => "/repositories/{project}/{repo}/pullrequests/{id}/comments",
            Self::UpdateComment | Self::DeleteComment | Self::Comment => {
                "/repositories/{project}/{repo}/pullrequests/{id}/comments/{comment}"
            }
            Self::Comments => "/repositories/{project}/{repo}/pullrequests/{id}/comments/",
            Self::Statuses => "/repositories/{project}/{repo}/pullrequests/{id}/statuses",
        }
    }

    const fn cloud_template(self) -> &'static str {
        match self {
            Self::Create => "/repositories/{project}/{repo}/pullrequests/",
            Self::Get => "/repositories/{project}/{repo}/pullrequests/{id}",
            Self::Merge => "/repositories/{project}/{repo}/pullrequests/{id}/merge",
            Self::Update
            | Self::List
            | Self::Activities
            | Self::Activity
            | Self::Commits
            | Self::Patch
            | Self::Diff
            | Self::Decline
            | Self::Approve
            | Self::UnApprove
            | Self::RequestChanges
            | Self::UnRequestChanges
            | Self::AddComment
            | Self::UpdateComment
            | Self::DeleteComment
            | Self::Comments
            | Self::Comment
            | Self::Statuses => self.server_template(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Substitutes `{project}`, `{repo}`, `{id}`, and `{comment}` in one pass.
///
/// Values are inserted verbatim, so a value that itself looks like a
/// placeholder is never expanded again.
fn interpolate(template: &str, target: RouteTarget<'_>) -> String {
    let mut output = String::with_capacity(template.len() + 32);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        output.push_str(literal);

        let Some(close) = tail.find('}') else {
            output.push_str(tail);
            return output;
        };
        let (placeholder, after) = tail.split_at(close + 1);
        let value = match placeholder {
            "{project}" => target.project,
            "{repo}" => target.repo_slug,
            "{id}" => target.pull_request_id,
            "{comment}" => target.comment_id,
            other => other,
        };
        output.push_str(value);
        rest = after;
    }

    output.push_str(rest);
    output
}
