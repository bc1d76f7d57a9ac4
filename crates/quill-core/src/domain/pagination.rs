//! Page window arithmetic shared by every listing.

use serde::Serialize;

use crate::error::{DomainError, FieldError};

pub const DEFAULT_PAGE: u64 = 1;
/// Default page size for the public listings.
pub const DEFAULT_LISTING_LIMIT: u64 = 5;
pub const MAX_LIMIT: u64 = 50;

/// A validated `(page, limit)` pair. `page >= 1`, `1 <= limit <= 50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Validate raw query values, substituting defaults for absent ones.
    pub fn new(
        page: Option<u64>,
        limit: Option<u64>,
        default_limit: u64,
    ) -> Result<Self, DomainError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(default_limit);
        let mut errors = Vec::new();

        if page < 1 {
            errors.push(FieldError::new("page", "Page must be a positive integer"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            errors.push(FieldError::new(
                "limit",
                format!("Limit must be between 1 and {MAX_LIMIT}"),
            ));
        }

        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(DomainError::Validation(errors))
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of items before this page. Saturates for absurd page numbers,
    /// which then simply lie past the end of any listing.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LISTING_LIMIT,
        }
    }
}

/// Navigation metadata for one page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    /// Pages past the end are not clamped: they report the real totals
    /// with `has_next = false`.
    pub fn compute(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(request.limit);
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

/// One page of items plus its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            info: PageInfo::compute(request, total),
        }
    }
}
