//! Query filter composition and fail-fast behaviour.

use mockall::predicate::always;
use rstest::rstest;
use url::Url;

use super::{CLOUD_BASE, SERVER_BASE, pull_request_options, recording_executor};
use crate::bitbucket::{ApiFlavor, MockApiExecutor, PullRequestError, PullRequests};
use crate::telemetry::NoopTelemetrySink;

fn query_values(url: &str, key: &str) -> Vec<String> {
    Url::parse(url)
        .expect("dispatched URL should parse")
        .query_pairs()
        .filter(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
        .collect()
}

#[rstest]
#[tokio::test]
async fn list_keeps_every_state_filter() {
    let (executor, log) = recording_executor(SERVER_BASE);
    let pulls = PullRequests::new(&executor, ApiFlavor::Server).with_telemetry(&NoopTelemetrySink);
    let options = pull_request_options().with_states(["OPEN", "MERGED"]);

    pulls.list(&options).await.expect("list should succeed");

    assert_eq!(
        query_values(&log.single().url, "state"),
        vec!["OPEN", "MERGED"]
    );
}

#[rstest]
#[tokio::test]
async fn list_composes_state_query_and_sort() {
    let (executor, log) = recording_executor(CLOUD_BASE);
    let pulls = PullRequests::new(&executor, ApiFlavor::Cloud).with_telemetry(&NoopTelemetrySink);
    let options = pull_request_options()
        .with_states(["OPEN"])
        .with_query("author.nickname=\"ada\"")
        .with_sort("-updated_on");

    pulls.list(&options).await.expect("list should succeed");

    assert_eq!(
        log.single().url,
        concat!(
            "https://api.bitbucket.org/2.0/repositories/PROJ/repo/pullrequests/",
            "?q=author.nickname%3D%22ada%22&sort=-updated_on&state=OPEN"
        )
    );
}

#[rstest]
#[tokio::test]
async fn statuses_apply_query_and_sort_but_not_states() {
    let (executor, log) = recording_executor(SERVER_BASE);
    let pulls = PullRequests::new(&executor, ApiFlavor::Server).with_telemetry(&NoopTelemetrySink);
    let options = pull_request_options()
        .with_states(["OPEN"])
        .with_query("state=\"SUCCESSFUL\"")
        .with_sort("created_on");

    pulls.statuses(&options).await.expect("statuses should succeed");

    let url = log.single().url;
    assert!(query_values(&url, "state").is_empty(), "unexpected state in {url}");
    assert_eq!(query_values(&url, "q"), vec!["state=\"SUCCESSFUL\""]);
    assert_eq!(query_values(&url, "sort"), vec!["created_on"]);
}

#[rstest]
#[tokio::test]
async fn unfiltered_operations_ignore_list_filters() {
    let (executor, log) = recording_executor(SERVER_BASE);
    let pulls = PullRequests::new(&executor, ApiFlavor::Server).with_telemetry(&NoopTelemetrySink);
    let options = pull_request_options()
        .with_states(["OPEN"])
        .with_sort("created_on");

    pulls.commits(&options).await.expect("commits should succeed");

    assert_eq!(
        log.single().url,
        "https://git.example.com/rest/api/1.0/repositories/PROJ/repo/pullrequests/7/commits"
    );
}

#[rstest]
#[tokio::test]
async fn unparsable_url_fails_before_dispatch() {
    let mut executor = MockApiExecutor::new();
    executor
        .expect_api_base_url()
        .return_const("http://[::1".to_owned());
    executor
        .expect_execute_paginated()
        .with(always(), always(), always(), always())
        .times(0);
    let pulls = PullRequests::new(&executor, ApiFlavor::Cloud).with_telemetry(&NoopTelemetrySink);
    let options = pull_request_options().with_states(["OPEN"]);

    let result = pulls.list(&options).await;

    assert!(
        matches!(result, Err(PullRequestError::InvalidUrl(_))),
        "expected InvalidUrl, got {result:?}"
    );
}

#[rstest]
#[tokio::test]
async fn malformed_url_without_filters_is_left_to_the_executor() {
    let (executor, log) = recording_executor("http://[::1");
    let pulls = PullRequests::new(&executor, ApiFlavor::Cloud).with_telemetry(&NoopTelemetrySink);

    pulls
        .list(&pull_request_options())
        .await
        .expect("list should be dispatched");

    assert_eq!(
        log.single().url,
        "http://[::1/repositories/PROJ/repo/pullrequests/"
    );
}
