//! Shared handler state.

use scp_core::PageRequest;
use scp_integrity::ReferenceManager;
use scp_interface::DocumentStore;

/// Page size defaults and bounds for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct PageLimits {
    default_page_size: u64,
    max_page_size: u64,
}

impl PageLimits {
    /// Create limits; `max_page_size` is raised to `default_page_size` if lower.
    pub fn new(default_page_size: u64, max_page_size: u64) -> Self {
        let default_page_size = default_page_size.max(1);
        Self {
            default_page_size,
            max_page_size: max_page_size.max(default_page_size),
        }
    }

    /// Resolve optional query parameters into a bounded page request.
    pub fn request(&self, page: Option<u64>, limit: Option<u64>) -> PageRequest {
        let limit = limit
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);
        PageRequest::new(page.unwrap_or(1), limit)
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::new(20, 100)
    }
}

/// State handed to every route.
#[derive(Debug)]
pub struct AppState<S: DocumentStore> {
    manager: ReferenceManager<S>,
    limits: PageLimits,
}

impl<S: DocumentStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            limits: self.limits,
        }
    }
}

impl<S: DocumentStore> AppState<S> {
    /// Bundle a manager with list limits.
    pub fn new(manager: ReferenceManager<S>, limits: PageLimits) -> Self {
        Self { manager, limits }
    }

    /// The reference-consistency manager.
    pub fn manager(&self) -> &ReferenceManager<S> {
        &self.manager
    }

    /// List limits.
    pub fn limits(&self) -> &PageLimits {
        &self.limits
    }
}
