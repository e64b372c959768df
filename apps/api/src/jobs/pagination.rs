//! Fixed-size pages over a result list.

use serde::{Deserialize, Serialize};

/// Previous/next navigation relative to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nav {
    Prev,
    Next,
}

/// One page of results. `page` is 1-based.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// `ceil(len / page_size)`, and never less than one; an empty list has one empty page.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    ((len + page_size - 1) / page_size).max(1)
}

/// Clamps `page` into `[1, total_pages]`.
pub fn clamp_page(page: usize, len: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(len, page_size))
}

/// Applies `nav` to `current`, staying within bounds.
pub fn navigate(current: usize, nav: Nav, len: usize, page_size: usize) -> usize {
    let target = match nav {
        Nav::Prev => current.saturating_sub(1),
        Nav::Next => current.saturating_add(1),
    };
    clamp_page(target, len, page_size)
}

pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = total_pages(items.len(), page_size);
    let page = page.clamp(1, total);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        total_pages: total,
        has_prev: page > 1,
        has_next: page < total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_of_twelve() {
        let items: Vec<u32> = (1..=12).collect();
        let page = paginate(&items, 1, 5);
        assert_eq!(page.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_prev);
        assert!(page.has_next);
    }

    #[test]
    fn test_last_page_is_partial_and_has_no_next() {
        let items: Vec<u32> = (1..=12).collect();
        let page = paginate(&items, 3, 5);
        assert_eq!(page.items, vec![11, 12]);
        assert!(page.has_prev);
        assert!(!page.has_next);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(paginate(&items, 9, 5).page, 2);
        assert_eq!(paginate(&items, 0, 5).page, 1);
    }

    #[test]
    fn test_empty_list_has_one_empty_page() {
        let page = paginate::<u32>(&[], 1, 5);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_prev && !page.has_next);
    }

    #[test]
    fn test_navigation_stops_at_bounds() {
        assert_eq!(navigate(1, Nav::Prev, 12, 5), 1);
        assert_eq!(navigate(1, Nav::Next, 12, 5), 2);
        assert_eq!(navigate(3, Nav::Next, 12, 5), 3);
    }
}
