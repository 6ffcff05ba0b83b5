//! Canned Bitbucket payloads for the pull request BDD tests.

use serde_json::{Value, json};

pub(crate) const PROJECT: &str = "PROJ";
pub(crate) const REPOSITORY: &str = "service";
pub(crate) const AUTH_TOKEN: &str = "bdd-token";

/// A pull request payload readable by both flavors' summaries.
fn pull_request_json(id: u32, state: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Pull request {id}"),
        "state": state,
        "author": {
            "display_name": "Ada",
            "user": { "displayName": "Ada" }
        }
    })
}

fn pull_requests(first_id: u32, count: u32) -> Vec<Value> {
    (first_id..first_id + count)
        .map(|id| pull_request_json(id, "OPEN"))
        .collect()
}

/// One Server page starting at item offset `start`.
pub(crate) fn server_page(start: u32, count: u32, next_start: Option<u32>) -> Value {
    let mut page = json!({
        "size": count,
        "limit": 25,
        "start": start,
        "isLastPage": next_start.is_none(),
        "values": pull_requests(start + 1, count),
    });
    if let (Some(next), Some(object)) = (next_start, page.as_object_mut()) {
        object.insert("nextPageStart".to_owned(), json!(next));
    }
    page
}

/// One Cloud page with an optional `next` link.
pub(crate) fn cloud_page(first_id: u32, count: u32, next: Option<String>) -> Value {
    let mut page = json!({
        "pagelen": 10,
        "values": pull_requests(first_id, count),
    });
    if let (Some(link), Some(object)) = (next, page.as_object_mut()) {
        object.insert("next".to_owned(), json!(link));
    }
    page
}
