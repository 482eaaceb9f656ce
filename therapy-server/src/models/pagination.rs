//! Pagination types
//!
//! One mechanism only: pages are 1-based and the offset is derived from
//! the page number. Pages past the end are empty, never an error.

use serde::{Deserialize, Serialize};

/// Stub list and search page size
pub const STUBS_PER_PAGE: u32 = 5;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl Pagination {
    /// Create pagination, clamping page and per_page to a minimum of 1.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: STUBS_PER_PAGE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl<T> Paginated<T> {
    /// Calculate total number of pages.
    pub fn total_pages(&self) -> u32 {
        if self.total <= 0 {
            1
        } else {
            let per_page = self.per_page.max(1) as i64;
            ((self.total + per_page - 1) / per_page) as u32
        }
    }

    /// Check if there's a next page.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there's a previous page.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Query parameters for pagination.
///
/// `page` is kept as raw text: anything that is not a positive integer
/// falls back to page 1 instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
}

impl PaginationParams {
    pub fn page_number(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|page| *page >= 1)
            .map(|page| page.min(u32::MAX as i64) as u32)
            .unwrap_or(1)
    }

    /// Stub pagination with the fixed page size.
    pub fn stubs(&self) -> Pagination {
        Pagination::new(self.page_number(), STUBS_PER_PAGE)
    }
}
