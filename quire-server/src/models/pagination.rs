//! Pagination for post listings

use serde::{Deserialize, Serialize};

/// Maximum items per page
const MAX_PER_PAGE: u32 = 100;

/// Default items per page when the site config doesn't say otherwise
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub per_page: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Per page is clamped to 1..=100
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Build from query parameters, falling back to `default_per_page`.
    pub fn from_params(params: &PaginationParams, default_per_page: u32) -> Self {
        Self::new(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(default_per_page),
        )
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
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
    pub fn new(items: Vec<T>, total: i64, page: Pagination) -> Self {
        Self {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        }
    }

    /// Calculate total number of pages.
    pub fn total_pages(&self) -> u32 {
        if self.total <= 0 {
            1
        } else {
            let per_page = self.per_page.max(1) as i64;
            ((self.total + per_page - 1) / per_page).max(1) as u32
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

    /// Navigation block handed to templates.
    pub fn nav(&self) -> PageNav {
        PageNav {
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages(),
            prev: self.has_prev().then(|| self.page - 1),
            next: self.has_next().then(|| self.page + 1),
        }
    }
}

/// Template-facing page navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageNav {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

/// Query parameters for pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
