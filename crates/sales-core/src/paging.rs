//! # Paging
//!
//! 1-based page requests and the slices repositories return for them.
//!
//! ```text
//!   total_count = 23, size = 10
//!
//!   page 1: items 1-10   has_previous = false  has_next = true
//!   page 2: items 11-20  has_previous = true   has_next = true
//!   page 3: items 21-23  has_previous = true   has_next = false
//!
//!   total_pages = ceil(23 / 10) = 3
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationErrors;
use crate::validation::{validate_page, Validate};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// A request for one page of results.
///
/// Values are not clamped here; [`Validate`] rejects out-of-range requests
/// before any repository sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageRequest {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

impl PageRequest {
    pub const fn new(page: i64, size: i64) -> Self {
        PageRequest { page, size }
    }

    /// Rows to skip for this page, or `None` when it does not fit in i64.
    pub fn checked_offset(&self) -> Option<i64> {
        self.page.saturating_sub(1).max(0).checked_mul(self.size.max(0))
    }

    /// Rows to skip for this page. Saturates; validated requests never do.
    pub fn offset(&self) -> i64 {
        self.checked_offset().unwrap_or(i64::MAX)
    }

    /// Highest page whose offset still fits in i64 for this size.
    pub fn max_page(&self) -> i64 {
        if self.size <= 0 {
            return i64::MAX;
        }
        (i64::MAX / self.size).saturating_add(1)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

impl Validate for PageRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_page(self)
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: &PageRequest) -> Self {
        Page {
            items,
            total_count,
            page: request.page,
            size: request.size,
        }
    }

    /// `ceil(total_count / size)`; zero when there are no rows.
    pub fn total_pages(&self) -> i64 {
        if self.size <= 0 {
            return 0;
        }
        (self.total_count + self.size - 1) / self.size
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Converts every item, keeping the paging data.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            size: self.size,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
