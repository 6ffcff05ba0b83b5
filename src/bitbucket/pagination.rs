//! Caller-supplied pagination context for listing operations.
//!
//! Without a [`PageRequest`] an executor walks every page and aggregates the
//! results. With one, only the requested page is fetched.

use super::endpoint::ApiFlavor;
use super::error::PullRequestError;

const MAX_PER_PAGE: u8 = 100;

/// A single page selection.
///
/// # Example
///
/// ```
/// use bitbucket_pulls::bitbucket::PageRequest;
///
/// let page = PageRequest::new(3, 25);
/// assert_eq!(page.page(), 3);
/// assert_eq!(page.per_page(), 25);
/// assert_eq!(page.server_start(), 50);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (1-based).
    page: u32,
    /// Items per page.
    per_page: u8,
}

impl PageRequest {
    /// Creates a page selection. Call [`PageRequest::validate`] before use.
    #[must_use]
    pub const fn new(page: u32, per_page: u8) -> Self {
        Self { page, per_page }
    }

    /// Sets the page number.
    #[must_use]
    pub const fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Sets the number of items per page.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page;
        self
    }

    /// Returns the page number (1-based).
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the number of items per page.
    #[must_use]
    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Zero-based item offset used by the Server `start` parameter.
    #[must_use]
    pub const fn server_start(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.per_page as u32)
    }

    /// Checks the page lies within the range both APIs accept.
    ///
    /// # Errors
    ///
    /// Returns [`PullRequestError::InvalidPagination`] when `page` is zero or
    /// `per_page` is outside `1..=100`.
    pub fn validate(&self) -> Result<(), PullRequestError> {
        if self.page == 0 {
            return Err(PullRequestError::InvalidPagination {
                message: "page must be at least 1".to_owned(),
            });
        }

        if self.per_page == 0 {
            return Err(PullRequestError::InvalidPagination {
                message: "per_page must be at least 1".to_owned(),
            });
        }

        if self.per_page > MAX_PER_PAGE {
            return Err(PullRequestError::InvalidPagination {
                message: format!("per_page must not exceed {MAX_PER_PAGE}"),
            });
        }

        Ok(())
    }

    /// Query parameters selecting this page for the given flavor.
    #[must_use]
    pub fn query_pairs(&self, flavor: ApiFlavor) -> [(&'static str, String); 2] {
        match flavor {
            ApiFlavor::Server => [
                ("start", self.server_start().to_string()),
                ("limit", self.per_page.to_string()),
            ],
            ApiFlavor::Cloud => [
                ("page", self.page.to_string()),
                ("pagelen", self.per_page.to_string()),
            ],
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 25,
        }
    }
}
