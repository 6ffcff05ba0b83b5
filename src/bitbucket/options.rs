//! Sparse, caller-supplied options for pull request operations.
//!
//! Optional fields left as `None` (or set to an empty string) are omitted
//! from request bodies and query strings. Identifier fields are interpolated
//! into URL templates as given; nothing here validates them.

use tokio_util::sync::CancellationToken;

use super::pagination::PageRequest;

/// Options shared by every pull request operation.
///
/// # Example
///
/// ```
/// use bitbucket_pulls::bitbucket::PullRequestOptions;
///
/// let options = PullRequestOptions::new("PROJ", "service")
///     .with_source_branch("feature/login")
///     .with_destination_branch("main")
///     .with_title("Add login")
///     .with_reviewers(["{user-a}", "{user-b}"]);
/// assert_eq!(options.reviewers.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PullRequestOptions {
    /// Project key (Server) or workspace (Cloud).
    pub project: String,
    /// Repository slug.
    pub repo_slug: String,
    /// Pull request identifier.
    pub id: String,
    /// Comment identifier for single-comment lookups.
    pub comment_id: String,
    /// Pull request title.
    pub title: Option<String>,
    /// Pull request description.
    pub description: Option<String>,
    /// Source branch short name.
    pub source_branch: Option<String>,
    /// Alternate source repository slug (forks).
    pub source_repository: Option<String>,
    /// Destination branch short name.
    pub destination_branch: Option<String>,
    /// Alternate destination repository slug.
    pub destination_repository: Option<String>,
    /// Reviewer identifiers, sent in order.
    pub reviewers: Vec<String>,
    /// State filters for listing, each sent as its own `state` parameter.
    pub states: Vec<String>,
    /// Free-text query filter (`q`).
    pub query: Option<String>,
    /// Sort key (`sort`).
    pub sort: Option<String>,
    /// Page selection for paginated operations.
    pub page: Option<PageRequest>,
    /// Cancellation token for single-shot JSON operations. Paginated and
    /// raw fetches ignore it and rely on the executor timeout.
    pub cancellation: Option<CancellationToken>,
}

impl PullRequestOptions {
    /// Creates options targeting a repository.
    #[must_use]
    pub fn new(project: impl Into<String>, repo_slug: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            repo_slug: repo_slug.into(),
            ..Self::default()
        }
    }

    /// Targets a specific pull request.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Targets a specific comment on the pull request.
    #[must_use]
    pub fn with_comment_id(mut self, comment_id: impl Into<String>) -> Self {
        self.comment_id = comment_id.into();
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the source branch.
    #[must_use]
    pub fn with_source_branch(mut self, branch: impl Into<String>) -> Self {
        self.source_branch = Some(branch.into());
        self
    }

    /// Sets an alternate source repository.
    #[must_use]
    pub fn with_source_repository(mut self, slug: impl Into<String>) -> Self {
        self.source_repository = Some(slug.into());
        self
    }

    /// Sets the destination branch.
    #[must_use]
    pub fn with_destination_branch(mut self, branch: impl Into<String>) -> Self {
        self.destination_branch = Some(branch.into());
        self
    }

    /// Sets an alternate destination repository.
    #[must_use]
    pub fn with_destination_repository(mut self, slug: impl Into<String>) -> Self {
        self.destination_repository = Some(slug.into());
        self
    }

    /// Replaces the reviewer list.
    #[must_use]
    pub fn with_reviewers<I, S>(mut self, reviewers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reviewers = reviewers.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the state filters.
    #[must_use]
    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = states.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the free-text query filter.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the sort key.
    #[must_use]
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Selects a single page instead of walking all pages.
    #[must_use]
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Options for adding, editing, or deleting a pull request comment.
#[derive(Debug, Clone, Default)]
pub struct PullRequestCommentOptions {
    /// Project key (Server) or workspace (Cloud).
    pub project: String,
    /// Repository slug.
    pub repo_slug: String,
    /// Pull request identifier.
    pub pull_request_id: String,
    /// Existing comment identifier, for edits and deletes.
    pub comment_id: String,
    /// Comment text sent as `content.raw`.
    pub content: String,
    /// Parent comment for threaded replies.
    pub parent: Option<u64>,
    /// Cancellation token for single-shot JSON operations. Paginated and
    /// raw fetches ignore it and rely on the executor timeout.
    pub cancellation: Option<CancellationToken>,
}

impl PullRequestCommentOptions {
    /// Creates options targeting a pull request.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        repo_slug: impl Into<String>,
        pull_request_id: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            repo_slug: repo_slug.into(),
            pull_request_id: pull_request_id.into(),
            ..Self::default()
        }
    }

    /// Targets an existing comment.
    #[must_use]
    pub fn with_comment_id(mut self, comment_id: impl Into<String>) -> Self {
        self.comment_id = comment_id.into();
        self
    }

    /// Sets the comment text.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Makes the comment a reply to `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Returns the value when it is present and non-empty.
pub(crate) fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|text| !text.is_empty())
}
