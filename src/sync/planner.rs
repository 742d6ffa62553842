//! Pagination planning
//!
//! Converts a total item count into the page requests needed to cover it.

use std::num::NonZeroU32;

/// A single page to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// Index of the first item on the page
    pub offset: u64,

    /// Number of items requested
    pub limit: u32,
}

impl PageRequest {
    /// Builds the request for the zero-based page `index`
    pub fn for_page(index: u64, page_size: NonZeroU32) -> Self {
        Self {
            offset: index * u64::from(page_size.get()),
            limit: page_size.get(),
        }
    }
}

/// Number of pages needed to cover `total_items`
pub fn total_pages(total_items: u64, page_size: NonZeroU32) -> u64 {
    total_items.div_ceil(u64::from(page_size.get()))
}

/// Plans one page request per page, with offsets `0, page_size, 2 * page_size, ...`
///
/// Every request, including the last, asks for a full `page_size`; the
/// remote service returns only what remains on the final page.
pub fn plan(total_items: u64, page_size: NonZeroU32) -> Vec<PageRequest> {
    (0..total_pages(total_items, page_size))
        .map(|index| PageRequest::for_page(index, page_size))
        .collect()
}
