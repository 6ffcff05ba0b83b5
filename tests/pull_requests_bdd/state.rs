//! Scenario state and client construction for the pull request BDD tests.

use bitbucket_pulls::{
    AccessToken, ApiBase, ApiFlavor, HttpExecutor, HttpExecutorConfig, PullRequestError,
};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use serde_json::Value;
use wiremock::{Mock, MockServer};

use super::fixtures::AUTH_TOKEN;
use super::runtime::{SharedRuntime, ensure_runtime_and_server};

#[derive(ScenarioState, Default)]
pub(crate) struct PullRequestState {
    pub(crate) runtime: Slot<SharedRuntime>,
    pub(crate) server: Slot<MockServer>,
    pub(crate) flavor: Slot<ApiFlavor>,
    pub(crate) response: Slot<Value>,
    pub(crate) raw: Slot<Vec<u8>>,
    pub(crate) error: Slot<PullRequestError>,
}

/// Everything a `When` step needs to call the facade.
pub(crate) struct Connection {
    pub(crate) runtime: SharedRuntime,
    pub(crate) executor: HttpExecutor,
    pub(crate) flavor: ApiFlavor,
}

impl PullRequestState {
    /// Starts the runtime and mock server, selecting `flavor` for later calls.
    ///
    /// Returns the mock server URI.
    pub(crate) fn start(&self, flavor: ApiFlavor) -> String {
        ensure_runtime_and_server(&self.runtime, &self.server)
            .unwrap_or_else(|error| panic!("failed to start scenario: {error}"));
        self.flavor.set(flavor);
        self.server
            .with_ref(MockServer::uri)
            .unwrap_or_else(|| panic!("mock server URL missing"))
    }

    /// Mounts `mock` on the scenario's server.
    pub(crate) fn mount(&self, mock: Mock) {
        let runtime = self
            .runtime
            .get()
            .unwrap_or_else(|| panic!("runtime not initialised"));
        runtime
            .mount(&self.server, mock)
            .unwrap_or_else(|error| panic!("failed to mount mock: {error}"));
    }

    /// Builds an executor pointed at the mock server.
    pub(crate) fn connect(&self) -> Connection {
        let runtime = self
            .runtime
            .get()
            .unwrap_or_else(|| panic!("runtime not initialised"));
        let flavor = self
            .flavor
            .get()
            .unwrap_or_else(|| panic!("flavor not selected"));
        let server_uri = self
            .server
            .with_ref(MockServer::uri)
            .unwrap_or_else(|| panic!("mock server URL missing"));

        let api_base = ApiBase::from_host(flavor, &server_uri)
            .unwrap_or_else(|error| panic!("mock server URL should parse: {error}"));
        let token = AccessToken::new(AUTH_TOKEN)
            .unwrap_or_else(|error| panic!("token should be valid: {error}"));
        let executor = HttpExecutor::new(HttpExecutorConfig::new(api_base, Some(token)))
            .unwrap_or_else(|error| panic!("executor should build: {error}"));

        Connection {
            runtime,
            executor,
            flavor,
        }
    }

    /// Stores a JSON outcome.
    pub(crate) fn record(&self, outcome: Result<Value, PullRequestError>) {
        match outcome {
            Ok(value) => self.response.set(value),
            Err(error) => self.error.set(error),
        }
    }

    /// Stores a raw outcome.
    pub(crate) fn record_raw(&self, outcome: Result<Vec<u8>, PullRequestError>) {
        match outcome {
            Ok(bytes) => self.raw.set(bytes),
            Err(error) => self.error.set(error),
        }
    }
}
