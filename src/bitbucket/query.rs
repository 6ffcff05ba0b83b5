//! Optional query-string filters for listing operations.
//!
//! Each filter is applied on its own: the URL is parsed, the filter's key is
//! replaced, and the query is re-encoded with keys in sorted order. Repeated
//! `state` values are appended as separate parameters. Because every step
//! replaces its own key and the encoding is sorted, filters can be applied in
//! any order and re-applying them leaves the URL unchanged.

use url::Url;

use super::error::PullRequestError;
use super::options::{PullRequestOptions, present};

const STATE_KEY: &str = "state";
const QUERY_KEY: &str = "q";
const SORT_KEY: &str = "sort";

/// Borrowed view over the filters an operation may carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryFilters<'options> {
    /// State values, one `state` parameter each.
    pub states: &'options [String],
    /// Free-text query.
    pub query: Option<&'options str>,
    /// Sort key.
    pub sort: Option<&'options str>,
}

impl<'options> QueryFilters<'options> {
    /// State, query, and sort filters from `options`.
    #[must_use]
    pub fn all(options: &'options PullRequestOptions) -> Self {
        Self {
            states: options.states.as_slice(),
            ..Self::query_and_sort(options)
        }
    }

    /// Query and sort filters from `options`; states are ignored.
    #[must_use]
    pub fn query_and_sort(options: &'options PullRequestOptions) -> Self {
        Self {
            states: &[],
            query: present(options.query.as_ref()),
            sort: present(options.sort.as_ref()),
        }
    }

    /// Returns true when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.query.is_none() && self.sort.is_none()
    }

    /// Applies every present filter to `url`.
    ///
    /// A URL without filters is returned untouched and never parsed.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::InvalidUrl`] from the first step whose URL
    /// cannot be parsed.
    pub fn apply(&self, url: &str) -> Result<String, PullRequestError> {
        let mut current = url.to_owned();

        if !self.states.is_empty() {
            let states: Vec<&str> = self.states.iter().map(String::as_str).collect();
            current = replace_query_values(&current, STATE_KEY, &states)?;
        }

        if let Some(query) = self.query {
            current = replace_query_values(&current, QUERY_KEY, &[query])?;
        }

        if let Some(sort) = self.sort {
            current = replace_query_values(&current, SORT_KEY, &[sort])?;
        }

        Ok(current)
    }
}

/// Replaces every `key` parameter of `url` with `values`, in order.
///
/// # Errors
///
/// Returns [`PullRequestError::InvalidUrl`] when `url` cannot be parsed.
pub fn replace_query_values(
    url: &str,
    key: &str,
    values: &[&str],
) -> Result<String, PullRequestError> {
    let mut parsed =
        Url::parse(url).map_err(|error| PullRequestError::InvalidUrl(format!("{url}: {error}")))?;

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(name, _)| name != key)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    pairs.extend(
        values
            .iter()
            .map(|value| (key.to_owned(), (*value).to_owned())),
    );
    pairs.sort_by(|left, right| left.0.cmp(&right.0));

    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }

    Ok(parsed.into())
}
