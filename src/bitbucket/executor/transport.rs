//! Reqwest-backed executor for the Bitbucket REST API.

use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use http::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::error_mapping::{map_decode_error, map_http_error, map_transport_error};
use super::{ApiExecutor, RequestBody};
use crate::bitbucket::endpoint::{AccessToken, ApiBase, ApiFlavor};
use crate::bitbucket::error::PullRequestError;
use crate::bitbucket::pagination::PageRequest;
use crate::bitbucket::query::replace_query_values;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const JSON_MEDIA_TYPE: &str = "application/json";
const ANY_MEDIA_TYPE: &str = "*/*";

/// Upper bound on pages followed by one listing call.
const MAX_PAGES: usize = 1000;

/// Configuration for [`HttpExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpExecutorConfig {
    /// API root and flavor.
    pub api_base: ApiBase,
    /// Bearer token; requests are sent anonymously when absent.
    pub token: Option<AccessToken>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl HttpExecutorConfig {
    /// Constructs configuration with default timeout and user agent.
    #[must_use]
    pub fn new(api_base: ApiBase, token: Option<AccessToken>) -> Self {
        Self {
            api_base,
            token,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Executor that performs requests with a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    api_base: ApiBase,
    token: Option<AccessToken>,
}

impl HttpExecutor {
    /// Builds an executor from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::Configuration`] when the HTTP client cannot
    /// be constructed.
    pub fn new(config: HttpExecutorConfig) -> Result<Self, PullRequestError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|error| PullRequestError::Configuration {
                message: format!("failed to configure HTTP client: {error}"),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base,
            token: config.token,
        })
    }

    /// Flavor of the API this executor talks to.
    #[must_use]
    pub const fn flavor(&self) -> ApiFlavor {
        self.api_base.flavor()
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: &RequestBody,
        accept: &str,
    ) -> Result<Vec<u8>, PullRequestError> {
        let operation = format!("{method} {url}");
        tracing::debug!("dispatching Bitbucket request: {operation}");

        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, accept);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.value());
        }
        request = match body {
            RequestBody::None => request,
            RequestBody::Empty => request.body(Vec::<u8>::new()),
            RequestBody::Json(json) => request
                .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
                .body(json.clone()),
        };

        let response = request
            .send()
            .await
            .map_err(|error| map_transport_error(&operation, &error))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|error| map_transport_error(&operation, &error))?;

        if !status.is_success() {
            tracing::debug!("Bitbucket request {operation} failed with status {status}");
            return Err(map_http_error(
                &operation,
                status,
                &String::from_utf8_lossy(&bytes),
            ));
        }

        Ok(bytes.to_vec())
    }

    async fn send_json(
        &self,
        method: Method,
        url: &str,
        body: &RequestBody,
    ) -> Result<Value, PullRequestError> {
        let bytes = self
            .send(method.clone(), url, body, JSON_MEDIA_TYPE)
            .await?;
        decode_json(&format!("{method} {url}"), &bytes)
    }

    async fn fetch_all_pages(
        &self,
        method: Method,
        url: &str,
        body: &RequestBody,
    ) -> Result<Value, PullRequestError> {
        let first = self.send_json(method.clone(), url, body).await?;
        let Some(mut values) = page_values(&first) else {
            return Ok(first);
        };

        let mut next = next_page_url(self.flavor(), url, &first)?;
        let mut fetched = 1;
        while let Some(next_url) = next {
            if fetched >= MAX_PAGES {
                tracing::warn!("stopped following pages of {url} after {MAX_PAGES} pages");
                break;
            }

            let page = self.send_json(method.clone(), &next_url, body).await?;
            values.extend(page_values(&page).unwrap_or_default());
            fetched += 1;
            next = next_page_url(self.flavor(), url, &page)?
                .filter(|following| *following != next_url);
        }

        Ok(Value::Array(values))
    }
}

#[async_trait]
impl ApiExecutor for HttpExecutor {
    fn api_base_url(&self) -> String {
        self.api_base.as_str().to_owned()
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<Value, PullRequestError> {
        self.send_json(method, url, &body).await
    }

    async fn execute_with_context(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
        cancellation: &CancellationToken,
    ) -> Result<Value, PullRequestError> {
        tokio::select! {
            biased;
            () = cancellation.cancelled() => Err(PullRequestError::Cancelled),
            result = self.send_json(method, url, &body) => result,
        }
    }

    async fn execute_paginated(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
        page: Option<PageRequest>,
    ) -> Result<Value, PullRequestError> {
        let Some(page) = page else {
            return self.fetch_all_pages(method, url, &body).await;
        };

        page.validate()?;
        let mut page_url = url.to_owned();
        for (key, value) in page.query_pairs(self.flavor()) {
            page_url = replace_query_values(&page_url, key, &[value.as_str()])?;
        }
        self.send_json(method, &page_url, &body).await
    }

    async fn execute_raw(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<Vec<u8>, PullRequestError> {
        self.send(method, url, &body, ANY_MEDIA_TYPE).await
    }
}

fn decode_json(operation: &str, bytes: &[u8]) -> Result<Value, PullRequestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|error| map_decode_error(operation, &error))
}

fn page_values(page: &Value) -> Option<Vec<Value>> {
    page.get("values").and_then(Value::as_array).cloned()
}

/// Location of the page after `page`, if the response says there is one.
///
/// Cloud pages link to their successor through `next`. Server pages report
/// `isLastPage` and `nextPageStart`, which is applied to the original URL.
fn next_page_url(
    flavor: ApiFlavor,
    original_url: &str,
    page: &Value,
) -> Result<Option<String>, PullRequestError> {
    match flavor {
        ApiFlavor::Cloud => Ok(page
            .get("next")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)),
        ApiFlavor::Server => {
            let is_last = page
                .get("isLastPage")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            let next_start = page.get("nextPageStart").and_then(Value::as_u64);

            match next_start {
                Some(start) if !is_last => {
                    replace_query_values(original_url, "start", &[start.to_string().as_str()])
                        .map(Some)
                }
                _ => Ok(None),
            }
        }
    }
}
