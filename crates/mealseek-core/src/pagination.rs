//! Offset pagination arithmetic for the search results list.
//!
//! The search API is offset-based: each request carries a 1-based `start`
//! index and a `count`. Pages are numbered from `1` and always hold
//! [`PAGE_SIZE`] results except possibly the last.
//!
//! ## Example with 95 results
//!
//! | page | `start` | display range |
//! |------|---------|---------------|
//! | 1    | 1       | `1-10 of 95`  |
//! | 2    | 11      | `11-20 of 95` |
//! | 10   | 91      | `91-95 of 95` |
//!
//! Every function here is total over non-negative inputs; a zero page or page
//! size is a caller bug but still yields a defined (empty) answer.

use std::fmt;

/// Number of results requested per page.
pub const PAGE_SIZE: u32 = 10;

/// Number of pages needed to show `total_results`; `0` when there are none.
#[must_use]
pub fn compute_total_pages(total_results: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_results.div_ceil(page_size)
}

/// 1-based index of the first result on `page`, as sent in the API's `start`.
#[must_use]
pub fn start_index(page: u32, page_size: u32) -> u32 {
    page.saturating_sub(1)
        .saturating_mul(page_size)
        .saturating_add(1)
}

/// The 1-based, inclusive range of result positions shown on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRange {
    pub first: u32,
    pub last: u32,
    pub total: u32,
}

impl DisplayRange {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first == 0
    }
}

impl fmt::Display for DisplayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} of {}", self.first, self.last, self.total)
    }
}

/// Range of result positions shown on `page`, with `last` clamped to
/// `total_results`.
///
/// A page that starts past the end (or a search with no results) yields the
/// empty range `0-0`.
#[must_use]
pub fn compute_display_range(page: u32, page_size: u32, total_results: u32) -> DisplayRange {
    let empty = DisplayRange {
        first: 0,
        last: 0,
        total: total_results,
    };
    if page == 0 || page_size == 0 {
        return empty;
    }

    let first = start_index(page, page_size);
    if first > total_results {
        return empty;
    }
    let last = page.saturating_mul(page_size).min(total_results);
    DisplayRange {
        first,
        last,
        total: total_results,
    }
}

/// One slot in the pagination control strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Computes which page buttons to show around `current`.
///
/// With `total_pages <= max_visible` every page is listed. Otherwise the first
/// and last pages are always present, a window of `max_visible - 2` pages is
/// centred on `current` (shifted to stay in range), and gaps are marked with
/// [`PageItem::Ellipsis`]. A single page (or none) needs no controls at all.
#[must_use]
pub fn page_window(current: u32, total_pages: u32, max_visible: u32) -> Vec<PageItem> {
    if total_pages <= 1 {
        return Vec::new();
    }
    if total_pages <= max_visible {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let inner = max_visible.saturating_sub(2).max(1);
    let half = inner / 2;
    let last_inner = total_pages - 1;

    let mut start = current.saturating_sub(half).max(2).min(last_inner.max(2));
    let end = start.saturating_add(inner - 1).min(last_inner);
    if end + 1 - start < inner {
        start = (end + 1).saturating_sub(inner).max(2);
    }

    let mut items = vec![PageItem::Page(1)];
    if start > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < last_inner {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total_pages));
    items
}
