use serde::Serialize;

/// Messages shown per inbox page.
pub const PAGE_SIZE: usize = 25;

/// Slice bounds into the newest-first id list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
    pub total_pages: usize,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Computes the window for `page_number` (1-based).
///
/// Pages past the end clamp to an empty `total_items..total_items` slice.
/// Page 0 is not a valid input and is treated like page 1.
pub fn window_for(total_items: usize, page_number: usize, page_size: usize) -> Window {
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };
    let start = page_number
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    Window {
        start,
        end,
        total_pages,
    }
}

/// Pagination metadata returned alongside a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page_number: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// Items actually inside this page; 0 past the last page.
    pub items_in_range: usize,
}

impl PageWindow {
    pub fn new(total_items: usize, page_number: usize, page_size: usize) -> Self {
        let w = window_for(total_items, page_number, page_size);
        Self {
            page_number: page_number.max(1),
            page_size,
            total_items,
            total_pages: w.total_pages,
            items_in_range: w.end - w.start,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }
}
