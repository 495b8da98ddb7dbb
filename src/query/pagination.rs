use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// A resolved, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Applies defaults and the configured ceiling.
    ///
    /// A missing or zero page becomes 1, a missing or zero limit becomes the
    /// default limit, and any limit above the maximum is clamped to it.
    pub fn resolve(page: Option<usize>, limit: Option<usize>, config: &PaginationConfig) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(config.default_limit)
            .min(config.max_limit);

        Self { page, limit }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl PaginationMeta {
    pub fn new(total: usize, request: PageRequest) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(request.limit.max(1)),
        }
    }
}

/// One slice of a filtered, ordered result set plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Slices `[(page-1)*limit, page*limit)` out of `items`. Pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(request.offset())
        .take(request.limit)
        .collect();

    Page {
        items,
        pagination: PaginationMeta::new(total, request),
    }
}
