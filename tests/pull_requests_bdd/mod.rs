//! Support modules for the pull request BDD tests.

pub(crate) mod fixtures;
#[path = "../support/runtime.rs"]
pub(crate) mod runtime;
pub(crate) mod state;

pub(crate) use fixtures::{AUTH_TOKEN, PROJECT, REPOSITORY, cloud_page, server_page};
pub(crate) use state::PullRequestState;
