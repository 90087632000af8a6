//! Pagination over a collection scan.

use serde::{Deserialize, Serialize};

/// A 1-based page window.
///
/// # Examples
///
/// ```
/// use scp_core::PageRequest;
///
/// let req = PageRequest::new(3, 20);
/// assert_eq!(req.skip(), 40);
/// assert_eq!(*req.limit(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PageRequest {
    /// Page number, starting at 1
    page: u64,
    /// Maximum documents per page
    limit: u64,
}

impl PageRequest {
    /// Create a window; a page of 0 is treated as the first page and a
    /// limit of 0 as a limit of 1.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Documents to skip before this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Position of a page within the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page, starting at 1
    pub page: u64,
    /// Maximum documents per page
    pub limit: u64,
    /// Documents in the collection
    pub total: u64,
    /// Pages needed to cover `total`
    pub total_pages: u64,
}

/// One page of documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Documents on this page, in insertion order
    pub data: Vec<T>,
    /// Where the page sits in the collection
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Assemble a page from a scan result and the collection count.
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: Pagination {
                page: request.page,
                limit: request.limit,
                total,
                total_pages: total.div_ceil(request.limit),
            },
        }
    }
}
