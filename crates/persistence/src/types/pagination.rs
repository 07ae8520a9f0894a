//! Pagination types for query plans.
//!
//! Query strings page through results with `limit`, `offset` and `page`. The
//! builder folds them into a single [`PageWindow`].

use serde::{Deserialize, Serialize};

/// Page size used when a query does not carry an explicit `limit`.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// The effective `(offset, limit)` window of a select plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageWindow {
    /// Number of rows to skip.
    pub offset: u64,

    /// Maximum number of rows to return.
    pub limit: u64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageWindow {
    /// Creates a window from an explicit offset and limit.
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Creates the window of a 1-based page number.
    ///
    /// Page numbers below 1 are treated as page 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskdesk_persistence::types::PageWindow;
    ///
    /// assert_eq!(PageWindow::for_page(2, 20), PageWindow::new(20, 20));
    /// assert_eq!(PageWindow::for_page(0, 20), PageWindow::new(0, 20));
    /// ```
    pub fn for_page(page: u64, limit: u64) -> Self {
        let offset = page.max(1).saturating_sub(1).saturating_mul(limit);
        Self { offset, limit }
    }
}
