use serde::Serialize;

/// Navigation facts for a page of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub num_pages: usize,
}

impl Pagination {
    pub fn new(current_page: usize, total_results: usize, results_per_page: usize) -> Self {
        let num_pages = if results_per_page == 0 {
            0
        } else {
            total_results.div_ceil(results_per_page)
        };
        Self {
            current_page,
            num_pages,
        }
    }

    /// Page to offer as "previous", if any
    pub fn prev(&self) -> Option<usize> {
        if self.num_pages > 1 && self.current_page > 1 && self.current_page <= self.num_pages {
            Some(self.current_page - 1)
        } else {
            None
        }
    }

    /// Page to offer as "next", if any
    pub fn next(&self) -> Option<usize> {
        if self.current_page >= 1 && self.current_page < self.num_pages {
            Some(self.current_page + 1)
        } else {
            None
        }
    }
}

/// Zero-indexed half-open slice of `items` for 1-based `page`, empty when out of range
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let end = page.saturating_mul(per_page).min(items.len());
    if page == 0 || start >= end {
        return &[];
    }
    &items[start..end]
}
