//! Typed request bodies for pull request and comment operations.
//!
//! The pull request body always carries `fromRef`, `toRef`, `reviewers`,
//! `title`, and `description`, even when every option is absent: the remote
//! API expects a stable shape. Optional sub-fields are filled only when the
//! caller supplied them.

use serde::Serialize;

use super::error::PullRequestError;
use super::options::{PullRequestCommentOptions, PullRequestOptions, present};

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Body sent by create, update, merge, and decline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestBody {
    /// Source branch reference.
    pub from_ref: BranchRef,
    /// Destination branch reference.
    pub to_ref: BranchRef,
    /// Reviewer references in caller order.
    pub reviewers: Vec<ReviewerRef>,
    /// Title; empty when absent.
    pub title: String,
    /// Description; empty when absent.
    pub description: String,
}

/// Branch pointer (`fromRef` / `toRef`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRef {
    /// Branch short name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
    /// Fully qualified ref, `refs/heads/<display_id>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Repository holding the branch when it is not the target repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<RefRepository>,
}

impl BranchRef {
    /// Points the reference at `branch`.
    #[must_use]
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.display_id = Some(branch.to_owned());
        self.id = Some(format!("{BRANCH_REF_PREFIX}{branch}"));
        self
    }

    /// Places the branch in repository `slug` of `project`.
    #[must_use]
    pub fn with_repository(mut self, slug: &str, project: &str) -> Self {
        self.repository = Some(RefRepository {
            name: slug.to_owned(),
            slug: slug.to_owned(),
            project: ProjectRef {
                key: project.to_owned(),
            },
        });
        self
    }

    fn from_parts(branch: Option<&str>, repository: Option<&str>, project: &str) -> Self {
        let reference = branch.map_or_else(Self::default, |name| Self::default().with_branch(name));
        match repository {
            Some(slug) => reference.with_repository(slug, project),
            None => reference,
        }
    }
}

/// Repository sub-mapping of a branch reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefRepository {
    /// Repository name (same as the slug).
    pub name: String,
    /// Repository slug.
    pub slug: String,
    /// Owning project.
    pub project: ProjectRef,
}

/// Project key wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    /// Project key.
    pub key: String,
}

/// Reviewer reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewerRef {
    /// Caller-supplied reviewer identifier.
    pub uuid: String,
}

impl PullRequestBody {
    /// Builds the body from sparse options.
    #[must_use]
    pub fn from_options(options: &PullRequestOptions) -> Self {
        let project = options.project.as_str();

        Self {
            from_ref: BranchRef::from_parts(
                present(options.source_branch.as_ref()),
                present(options.source_repository.as_ref()),
                project,
            ),
            to_ref: BranchRef::from_parts(
                present(options.destination_branch.as_ref()),
                present(options.destination_repository.as_ref()),
                project,
            ),
            reviewers: options
                .reviewers
                .iter()
                .map(|uuid| ReviewerRef { uuid: uuid.clone() })
                .collect(),
            title: present(options.title.as_ref())
                .unwrap_or_default()
                .to_owned(),
            description: present(options.description.as_ref())
                .unwrap_or_default()
                .to_owned(),
        }
    }

    /// Serialises the body to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when serialisation
    /// fails.
    pub fn to_json(&self) -> Result<String, PullRequestError> {
        to_json(self)
    }
}

/// Body sent when adding or editing a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentBody {
    /// Comment text.
    pub content: CommentContent,
    /// Parent comment for threaded replies; omitted entirely when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentParent>,
}

/// `content` sub-mapping of a comment body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentContent {
    /// Raw comment text.
    pub raw: String,
}

/// `parent` sub-mapping of a comment body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommentParent {
    /// Parent comment identifier.
    pub id: u64,
}

impl CommentBody {
    /// Builds the body from comment options.
    #[must_use]
    pub fn from_options(options: &PullRequestCommentOptions) -> Self {
        Self {
            content: CommentContent {
                raw: options.content.clone(),
            },
            parent: options.parent.map(|id| CommentParent { id }),
        }
    }

    /// Serialises the body to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::BodySerialisation`] when serialisation
    /// fails.
    pub fn to_json(&self) -> Result<String, PullRequestError> {
        to_json(self)
    }
}

fn to_json<T: Serialize>(body: &T) -> Result<String, PullRequestError> {
    serde_json::to_string(body).map_err(|error| PullRequestError::BodySerialisation {
        message: error.to_string(),
    })
}
