//! Pagination usage errors.

use thiserror::Error;

/// Misuse of the page API.
#[derive(Debug, Error)]
pub enum PaginationError {
    /// `get_next_page` was called on a terminal page.
    #[error("No next page expected; please check `has_next_page()` before calling `get_next_page()`.")]
    NoNextPage,
}
