//! Unit tests for the pull request facade.
//!
//! Tests are organised into modules by functional area:
//! - `routing`: URL and verb resolution for both flavors
//! - `bodies`: request payloads handed to the executor
//! - `filters`: query filter composition and fail-fast behaviour
//! - `dispatch`: executor verb selection and result pass-through
//! - `diagnostics`: telemetry recorded before dispatch

mod filters;

use std::sync::{Arc, Mutex};

use http::Method;
use serde_json::{Value, json};

use super::{
    MockApiExecutor, Operation, PageRequest, PullRequestCommentOptions, PullRequestError,
    PullRequestOptions, PullRequests, RequestBody,
};

pub const SERVER_BASE: &str = "https://git.example.com/rest/api/1.0";
pub const CLOUD_BASE: &str = "https://api.bitbucket.org/2.0";

/// Executor entry point that received a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Execute,
    WithContext,
    Paginated(Option<PageRequest>),
    Raw,
}

/// One request observed by the recording executor.
#[derive(Debug, Clone)]
pub struct Call {
    pub verb: Verb,
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

impl Call {
    pub fn json_body(&self) -> Value {
        let json = self.body.as_json().expect("call should carry a JSON body");
        serde_json::from_str(json).expect("body should be valid JSON")
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, verb: Verb, method: Method, url: &str, body: RequestBody) {
        self.0
            .lock()
            .expect("call log mutex should be available")
            .push(Call {
                verb,
                method,
                url: url.to_owned(),
                body,
            });
    }

    pub fn take(&self) -> Vec<Call> {
        self.0
            .lock()
            .expect("call log mutex should be available")
            .drain(..)
            .collect()
    }

    pub fn single(&self) -> Call {
        let mut calls = self.take();
        assert_eq!(calls.len(), 1, "expected exactly one call, got {calls:?}");
        calls.remove(0)
    }
}

/// Mock executor rooted at `base` that records every call and answers with
/// an empty JSON object (or `b"raw"` for raw calls).
pub fn recording_executor(base: &str) -> (MockApiExecutor, CallLog) {
    let log = CallLog::default();
    let mut executor = MockApiExecutor::new();
    executor.expect_api_base_url().return_const(base.to_owned());

    let execute_log = log.clone();
    executor
        .expect_execute()
        .returning(move |method, url, body| {
            execute_log.push(Verb::Execute, method, url, body);
            Ok(json!({}))
        });

    let context_log = log.clone();
    executor
        .expect_execute_with_context()
        .returning(move |method, url, body, _cancellation| {
            context_log.push(Verb::WithContext, method, url, body);
            Ok(json!({}))
        });

    let paginated_log = log.clone();
    executor
        .expect_execute_paginated()
        .returning(move |method, url, body, page| {
            paginated_log.push(Verb::Paginated(page), method, url, body);
            Ok(json!([]))
        });

    let raw_log = log.clone();
    executor
        .expect_execute_raw()
        .returning(move |method, url, body| {
            raw_log.push(Verb::Raw, method, url, body);
            Ok(b"raw".to_vec())
        });

    (executor, log)
}

pub fn pull_request_options() -> PullRequestOptions {
    PullRequestOptions::new("PROJ", "repo")
        .with_id("7")
        .with_comment_id("99")
}

pub fn comment_options() -> PullRequestCommentOptions {
    PullRequestCommentOptions::new("PROJ", "repo", "7")
        .with_comment_id("99")
        .with_content("looks good")
}

/// Calls the facade method that serves `operation`, discarding its result.
pub async fn invoke(
    pulls: &PullRequests<'_, MockApiExecutor>,
    operation: Operation,
    options: &PullRequestOptions,
    comment: &PullRequestCommentOptions,
) -> Result<(), PullRequestError> {
    match operation {
        Operation::Create => pulls.create(options).await.map(drop),
        Operation::Update => pulls.update(options).await.map(drop),
        Operation::List => pulls.list(options).await.map(drop),
        Operation::Get => pulls.get(options).await.map(drop),
        Operation::Activities => pulls.activities(options).await.map(drop),
        Operation::Activity => pulls.activity(options).await.map(drop),
        Operation::Commits => pulls.commits(options).await.map(drop),
        Operation::Patch => pulls.patch(options).await.map(drop),
        Operation::Diff => pulls.diff(options).await.map(drop),
        Operation::Merge => pulls.merge(options).await.map(drop),
        Operation::Decline => pulls.decline(options).await.map(drop),
        Operation::Approve => pulls.approve(options).await.map(drop),
        Operation::UnApprove => pulls.unapprove(options).await.map(drop),
        Operation::RequestChanges => pulls.request_changes(options).await.map(drop),
        Operation::UnRequestChanges => pulls.unrequest_changes(options).await.map(drop),
        Operation::AddComment => pulls.add_comment(comment).await.map(drop),
        Operation::UpdateComment => pulls.update_comment(comment).await.map(drop),
        Operation::DeleteComment => pulls.delete_comment(comment).await.map(drop),
        Operation::Comments => pulls.comments(options).await.map(drop),
        Operation::Comment => pulls.comment(options).await.map(drop),
        Operation::Statuses => pulls.statuses(options).await.map(drop),
    }
}
