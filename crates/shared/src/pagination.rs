//! Offset pagination utilities for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size for list responses.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Upper bound on page size to keep list queries cheap.
pub const MAX_PER_PAGE: i64 = 100;

/// Query parameters for paginated list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageQuery {
    /// Clamps page and per_page into their allowed ranges.
    pub fn normalized(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL LIMIT value.
    pub fn limit(&self) -> i64 {
        self.normalized().per_page
    }

    /// SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        let n = self.normalized();
        (n.page - 1) * n.per_page
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// Builds pagination metadata from the normalized query and a total count.
    pub fn new(query: &PageQuery, total: i64) -> Self {
        let n = query.normalized();
        let total_pages = if total == 0 {
            0
        } else {
            (total + n.per_page - 1) / n.per_page
        };
        Self {
            page: n.page,
            per_page: n.per_page,
            total,
            total_pages,
        }
    }
}
